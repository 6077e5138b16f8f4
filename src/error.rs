//! Error types surfaced by the core to the shell.
//!
//! Every variant is recoverable: the worst outcome is a dismissed alert and a
//! session back in its reset state.

use thiserror::Error;

use crate::model::GapHeight;

/// Rejected configuration values (gap input, layout overrides).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("gap height must be a whole number of pixels, got {0:?}")]
    GapNotANumber(String),
    #[error("gap height {0} is outside 0..={max}", max = GapHeight::MAX)]
    GapOutOfRange(i64),
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

/// Failures while turning file bytes into a [`SourceImage`](crate::model::SourceImage).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no image data was provided")]
    Empty,
    #[error("image has zero width or height")]
    ZeroSized,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Failures of an export request.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no image is loaded")]
    NoImage,
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}
