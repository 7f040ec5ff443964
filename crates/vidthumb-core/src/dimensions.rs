/// Sample (pixel) aspect ratio of a stream, as `num / den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleAspectRatio {
    pub num: i32,
    pub den: i32,
}

impl SampleAspectRatio {
    pub fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// True for a defined ratio that is not 1:1, i.e. an anamorphic stream.
    pub fn is_anamorphic(&self) -> bool {
        self.num > 0 && self.den > 0 && self.num != self.den
    }
}

/// Computes the output size of a thumbnail that fits in a
/// `square_size` x `square_size` box.
///
/// Without `maintain_aspect_ratio` the thumbnail is forced square. Otherwise
/// the longer side becomes `square_size` and the shorter one is scaled
/// proportionally, truncated toward zero. An anamorphic sample aspect ratio
/// widens (or narrows) the source width before the comparison.
pub fn calculate_dimensions(
    square_size: u32,
    maintain_aspect_ratio: bool,
    src_width: u32,
    src_height: u32,
    sample_aspect_ratio: Option<SampleAspectRatio>,
) -> (u32, u32) {
    if !maintain_aspect_ratio || src_width == 0 || src_height == 0 {
        return (square_size, square_size);
    }

    let mut src_width = src_width as u64;
    let src_height = src_height as u64;
    if let Some(sar) = sample_aspect_ratio.filter(SampleAspectRatio::is_anamorphic) {
        src_width = (src_width * sar.num as u64 / sar.den as u64).max(1);
    }

    // Single precision keeps existing thumbnail sizes stable.
    let (width, height) = if src_width > src_height {
        let scaled = square_size as f32 / src_width as f32 * src_height as f32;
        (square_size, scaled as u32)
    } else {
        let scaled = square_size as f32 / src_height as f32 * src_width as f32;
        (scaled as u32, square_size)
    };

    (width.max(1), height.max(1))
}
