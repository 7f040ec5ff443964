use thiserror::Error;

use vidthumb_core::error::CoreError;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to open file: {0}")]
    OpenFailed(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("no decoder available for codec {0}")]
    DecoderNotFound(String),

    #[error("decoder error: {0}")]
    DecoderError(String),

    #[error("seek error: {0}")]
    SeekError(String),

    #[error("filter graph error: {0}")]
    Filter(String),

    #[error("scale error: {0}")]
    Scale(String),

    #[error("decoder is not initialized")]
    NotInitialized,

    #[error("no decoded frame available")]
    NoFrame,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, MediaError>;
