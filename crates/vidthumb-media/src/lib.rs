pub mod decoder;
pub mod deinterlace;
pub mod error;
pub mod init;
pub mod scaler;
pub mod thumbnailer;
