// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! A color-bitmap tile codec and scan/deskew pipeline, in the style of
//! CIMBAR: a frame is a square grid of cells, each cell a tinted glyph
//! encoding `symbol_bits + color_bits` of payload, bordered by four
//! 1:1:3:1:1 finder markers so a photographed or re-encoded frame can be
//! located and rectified before decoding.
//!
//! Modules, leaf-first:
//! - [`error`] / [`config`]: shared error taxonomy and pipeline configuration.
//! - [`palette`]: fixed light/dark color tables and CIE76 nearest-color lookup.
//! - [`tile`]: glyph tile loading, palette tinting, perceptual hashing.
//! - [`codec`]: `encode`/`decode` between cell values and tile images.
//! - [`grid`]: deterministic cell-center enumeration over the rectified frame.
//! - [`scan`]: three-pass finder-marker detection.
//! - [`deskew`]: perspective rectification from detected markers to a
//!   canonical square.
//! - [`log`]: file-backed structured logging, shared by the library and the
//!   `cimbar` command-line front end.

pub mod config;
pub mod error;
pub mod palette;
pub mod tile;
pub mod codec;
pub mod grid;
pub mod scan;
pub mod deskew;
pub mod log;

pub use codec::Codec;
pub use config::CimbarConfig;
pub use error::{CimbarError, Result};
pub use deskew::Deskewer;
pub use grid::{GridGeometry, GridWalker};
pub use palette::ColorPalette;
pub use scan::{scan as scan_frame, Candidate, ScanResult};
pub use tile::TileLibrary;
