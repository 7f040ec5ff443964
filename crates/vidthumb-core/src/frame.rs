/// Bytes per pixel of the packed RGB24 layout every scaled frame uses.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// A scaled RGB24 frame as produced by the decoder.
///
/// Rows are `line_size` bytes apart. The scaler aligns rows, so `line_size`
/// can be larger than `width * 3`; the trailing bytes of a row are padding
/// and carry no pixel data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes.
    pub line_size: usize,
    /// `line_size * height` bytes, row-major.
    pub frame_data: Vec<u8>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, line_size: usize, frame_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            line_size,
            frame_data,
        }
    }

    /// Number of bytes in a row that hold pixels.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * RGB_BYTES_PER_PIXEL
    }

    /// Minimum buffer length that still holds every visible pixel. The last
    /// row does not need its padding.
    pub fn required_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        self.line_size * (self.height as usize - 1) + self.row_bytes()
    }

    /// Visible bytes of row `y`, without padding.
    ///
    /// Panics if `y` is out of range or the buffer is shorter than
    /// `required_len`.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.line_size;
        &self.frame_data[start..start + self.row_bytes()]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.line_size;
        let end = start + self.row_bytes();
        &mut self.frame_data[start..end]
    }

    /// Iterates the visible part of every row.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_bytes = self.row_bytes();
        let height = self.height as usize;
        self.frame_data
            .chunks(self.line_size.max(1))
            .take(height)
            .map(move |row| &row[..row_bytes.min(row.len())])
    }
}
