use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid seek time {0:?}, expected HH:MM:SS")]
    InvalidSeekTime(String),

    #[error("frame buffer too small: expected at least {expected} bytes, got {actual}")]
    FrameBufferTooSmall { expected: usize, actual: usize },

    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
