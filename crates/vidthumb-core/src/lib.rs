pub mod config;
pub mod dimensions;
pub mod error;
pub mod filter;
pub mod frame;
pub mod histogram;
pub mod image_writer;
pub mod seek;
pub mod smart;
