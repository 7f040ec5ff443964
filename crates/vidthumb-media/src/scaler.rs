use rsmpeg::avutil::AVFrame;
use rsmpeg::ffi;
use rsmpeg::swscale::SwsContext;

use vidthumb_core::frame::VideoFrame;

use crate::error::{MediaError, Result};

/// Pixel format of every frame handed out by the decoder.
pub const THUMBNAIL_PIXEL_FORMAT: ffi::AVPixelFormat = ffi::AV_PIX_FMT_RGB24;

/// Converts `frame` to `dst_format` at `width` x `height` with bicubic
/// resampling. The conversion context is built for this one frame.
pub fn convert_and_scale(
    frame: &AVFrame,
    dst_format: ffi::AVPixelFormat,
    width: i32,
    height: i32,
) -> Result<AVFrame> {
    if frame.width <= 0 || frame.height <= 0 || width <= 0 || height <= 0 {
        return Err(MediaError::Scale(format!(
            "invalid geometry {}x{} -> {width}x{height}",
            frame.width, frame.height
        )));
    }

    let mut sws = SwsContext::get_context(
        frame.width,
        frame.height,
        frame.format,
        width,
        height,
        dst_format,
        ffi::SWS_BICUBIC,
        None,
        None,
        None,
    )
    .ok_or_else(|| {
        MediaError::Scale(format!(
            "no conversion from pixel format {} at {}x{}",
            frame.format, frame.width, frame.height
        ))
    })?;

    let mut dst_frame = AVFrame::new();
    dst_frame.set_width(width);
    dst_frame.set_height(height);
    dst_frame.set_format(dst_format);
    dst_frame
        .alloc_buffer()
        .map_err(|e| MediaError::Scale(format!("alloc_buffer: {e}")))?;

    sws.scale_frame(frame, 0, frame.height, &mut dst_frame)
        .map_err(|e| MediaError::Scale(format!("scale_frame: {e}")))?;

    Ok(dst_frame)
}

/// Copies the first plane of a packed RGB24 frame, row padding included.
pub fn to_video_frame(frame: &AVFrame) -> Result<VideoFrame> {
    if frame.format != THUMBNAIL_PIXEL_FORMAT {
        return Err(MediaError::Scale(format!(
            "expected RGB24 frame, got pixel format {}",
            frame.format
        )));
    }
    let line_size = frame.linesize[0];
    if line_size <= 0 || frame.height <= 0 || frame.data[0].is_null() {
        return Err(MediaError::Scale("frame has no pixel data".into()));
    }

    let line_size = line_size as usize;
    let len = line_size * frame.height as usize;
    // alloc_buffer sizes the plane as linesize * height.
    let frame_data = unsafe { std::slice::from_raw_parts(frame.data[0] as *const u8, len).to_vec() };

    Ok(VideoFrame::new(
        frame.width as u32,
        frame.height as u32,
        line_size,
        frame_data,
    ))
}
