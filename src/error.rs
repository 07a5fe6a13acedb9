// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Crate-wide error taxonomy.
//!
//! Mirrors the way the rest of this codebase handles errors: a plain enum
//! with hand-written `Display`/`Error` impls (see `render::image::DatFileError`,
//! `ui::UIError`) rather than a derive-macro crate.

use std::fmt;

#[derive(Debug)]
pub enum CimbarError {
    /// Value out of the domain the caller asked for: an out-of-range
    /// `bits` passed to `encode`, or a `color_bits` with no palette table.
    InvalidArgument(String),
    /// A tile asset was absent or unreadable at the expected path.
    AssetMissing(String),
    /// The scanner found fewer than 4 filtered anchors in a frame.
    DetectionFailed(String),
    /// A cell or frame had unexpected dimensions for the operation.
    MalformedImage(String),
    Io(std::io::Error),
    Image(image::ImageError),
}

impl fmt::Display for CimbarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CimbarError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            CimbarError::AssetMissing(msg) => write!(f, "asset missing: {}", msg),
            CimbarError::DetectionFailed(msg) => write!(f, "detection failed: {}", msg),
            CimbarError::MalformedImage(msg) => write!(f, "malformed image: {}", msg),
            CimbarError::Io(e) => write!(f, "io error: {}", e),
            CimbarError::Image(e) => write!(f, "image error: {}", e),
        }
    }
}

impl std::error::Error for CimbarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CimbarError::Io(e) => Some(e),
            CimbarError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CimbarError {
    fn from(e: std::io::Error) -> Self {
        CimbarError::Io(e)
    }
}

impl From<image::ImageError> for CimbarError {
    fn from(e: image::ImageError) -> Self {
        CimbarError::Image(e)
    }
}

pub type Result<T> = std::result::Result<T, CimbarError>;
