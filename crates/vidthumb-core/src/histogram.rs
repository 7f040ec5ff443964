use crate::frame::{RGB_BYTES_PER_PIXEL, VideoFrame};

pub const HISTOGRAM_BUCKETS: usize = 256;

/// Per-channel byte value counts of an RGB frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram<T> {
    pub r: [T; HISTOGRAM_BUCKETS],
    pub g: [T; HISTOGRAM_BUCKETS],
    pub b: [T; HISTOGRAM_BUCKETS],
}

impl<T: Copy + Default> Default for Histogram<T> {
    fn default() -> Self {
        Self {
            r: [T::default(); HISTOGRAM_BUCKETS],
            g: [T::default(); HISTOGRAM_BUCKETS],
            b: [T::default(); HISTOGRAM_BUCKETS],
        }
    }
}

impl<T: Copy + Default> Histogram<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Histogram<u32> {
    /// Counts every visible pixel of `frame`. Row padding is skipped.
    pub fn from_frame(frame: &VideoFrame) -> Self {
        let mut histogram = Self::new();
        for row in frame.rows() {
            for pixel in row.chunks_exact(RGB_BYTES_PER_PIXEL) {
                histogram.r[pixel[0] as usize] += 1;
                histogram.g[pixel[1] as usize] += 1;
                histogram.b[pixel[2] as usize] += 1;
            }
        }
        histogram
    }
}
