use vidthumb_core::frame::{RGB_BYTES_PER_PIXEL, VideoFrame};

/// Pixel content of a built frame.
#[derive(Debug, Clone, Copy)]
enum Fill {
    Solid([u8; 3]),
    /// Horizontal ramp from black to `[255, 128, 64]`, shifted by `offset`.
    Gradient { offset: u8 },
}

/// Builder for synthetic `VideoFrame`s with sensible defaults.
pub struct FrameBuilder {
    width: u32,
    height: u32,
    padding: usize,
    padding_byte: u8,
    fill: Fill,
}

impl FrameBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            padding: 0,
            padding_byte: 0xAB,
            fill: Fill::Solid([128, 128, 128]),
        }
    }

    pub fn solid(mut self, r: u8, g: u8, b: u8) -> Self {
        self.fill = Fill::Solid([r, g, b]);
        self
    }

    pub fn black(self) -> Self {
        self.solid(0, 0, 0)
    }

    pub fn gradient(mut self, offset: u8) -> Self {
        self.fill = Fill::Gradient { offset };
        self
    }

    /// Extra bytes at the end of every row, filled with `byte`.
    pub fn padding(mut self, bytes: usize, byte: u8) -> Self {
        self.padding = bytes;
        self.padding_byte = byte;
        self
    }

    pub fn build(self) -> VideoFrame {
        let row_bytes = self.width as usize * RGB_BYTES_PER_PIXEL;
        let line_size = row_bytes + self.padding;
        let mut data = Vec::with_capacity(line_size * self.height as usize);

        for _ in 0..self.height {
            for x in 0..self.width {
                let pixel = match self.fill {
                    Fill::Solid(rgb) => rgb,
                    Fill::Gradient { offset } => {
                        let ramp = (x * 255 / self.width.max(1)) as u8;
                        let v = ramp.wrapping_add(offset);
                        [v, v / 2, v / 4]
                    }
                };
                data.extend_from_slice(&pixel);
            }
            data.extend(std::iter::repeat_n(self.padding_byte, self.padding));
        }

        VideoFrame::new(self.width, self.height, line_size, data)
    }
}
