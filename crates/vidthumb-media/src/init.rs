use std::sync::Once;

static FFMPEG_INIT: Once = Once::new();

/// Process-wide FFmpeg setup. Safe to call from any thread, any number of
/// times; only the first call does work.
pub fn ensure_ffmpeg_initialized() {
    FFMPEG_INIT.call_once(|| {
        // Decoders complain loudly about damaged streams, which the decoder
        // already tolerates.
        unsafe {
            rsmpeg::ffi::av_log_set_level(rsmpeg::ffi::AV_LOG_ERROR as i32);
        }
        tracing::debug!("ffmpeg initialized");
    });
}
