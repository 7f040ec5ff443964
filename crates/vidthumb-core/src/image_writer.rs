use image::RgbImage;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::frame::VideoFrame;

/// Turns scaled frames into displayable images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageWriter;

impl ImageWriter {
    pub fn new() -> Self {
        Self
    }

    /// Copies `frame` into a tightly packed `RgbImage`.
    ///
    /// Rows are copied one by one using `line_size` as the source pitch; a
    /// single flat copy would shear the image whenever the scaler padded its
    /// rows.
    pub fn write_frame(&self, frame: &VideoFrame) -> Result<RgbImage> {
        if frame.width == 0 || frame.height == 0 || frame.line_size < frame.row_bytes() {
            return Err(CoreError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            });
        }
        let expected = frame.required_len();
        if frame.frame_data.len() < expected {
            return Err(CoreError::FrameBufferTooSmall {
                expected,
                actual: frame.frame_data.len(),
            });
        }

        let row_bytes = frame.row_bytes();
        let mut pixels = vec![0u8; row_bytes * frame.height as usize];
        for (dst, src) in pixels.chunks_exact_mut(row_bytes).zip(frame.rows()) {
            dst.copy_from_slice(src);
        }

        debug!(
            width = frame.width,
            height = frame.height,
            line_size = frame.line_size,
            "wrote frame to image"
        );

        RgbImage::from_raw(frame.width, frame.height, pixels).ok_or(CoreError::InvalidDimensions {
            width: frame.width,
            height: frame.height,
        })
    }
}
