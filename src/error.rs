use std::path::PathBuf;

use crate::plate::PlateFormat;

/// Errors that can stop a tiling run.
///
/// Everything except the I/O and codec variants is detected before the first
/// image is decoded.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("invalid format definition ({0}), expected <cols>x<rows> such as 12x8")]
    InvalidFormat(String),

    #[error("number of found image sets ({found}) is less than {required}")]
    InsufficientImages { found: usize, required: usize },

    #[error("invalid target range {start}..={end} for a plate of {wells} wells")]
    InvalidRange { start: usize, end: usize, wells: usize },

    #[error("channel count must be at least 1")]
    InvalidChannelCount,

    #[error("a {format} plate of {channels}-channel {width}x{height} px cells does not fit in one image")]
    CanvasTooLarge {
        format: PlateFormat,
        channels: usize,
        width: u32,
        height: u32,
    },

    #[error("no *Run.png images in {}", .0.display())]
    NoImages(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
