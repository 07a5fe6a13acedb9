// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Pipeline configuration: every numeric constant shared by the tile
//! library, codec, scanner and grid walker lives here so a caller
//! configures the whole pipeline once and threads one `CimbarConfig`
//! through it, the way `tools/cargo-pixel` loads a single toml-backed
//! config struct for its subcommands.

use crate::error::{CimbarError, Result};
use serde::{Deserialize, Serialize};

/// Pixel size (width == height) of a single glyph tile in the reference
/// asset set. Parametric elsewhere, but asset paths always store 8x8 PNGs.
pub const TILE_SIZE: u32 = 8;

/// Side length in pixels of a rectified, deskewed frame.
pub const CANONICAL_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CimbarConfig {
    /// Number of bits carried by the glyph channel; N = 2^symbol_bits tiles.
    pub symbol_bits: u32,
    /// Number of bits carried by the fill-color channel.
    pub color_bits: u32,
    /// Light-on-dark rendering: glyph ink is light, tile background is dark.
    pub dark: bool,
    /// Pixels per cell in the rectified grid.
    pub spacing: u32,
    /// Cells per side of the rectified grid.
    pub dimensions: u32,
    /// Cells occupied (per side) by each corner finder marker.
    pub marker_size: u32,
    /// Pixel offset of the grid origin within the rectified frame.
    pub offset: u32,
    /// Row/column stride used by the horizontal and vertical scan passes.
    pub skip: u32,
}

impl Default for CimbarConfig {
    fn default() -> Self {
        CimbarConfig {
            symbol_bits: 4,
            color_bits: 3,
            dark: false,
            spacing: 4,
            dimensions: 128,
            marker_size: 8,
            offset: 0,
            skip: 17,
        }
    }
}

impl CimbarConfig {
    /// Number of glyph identities, `2^symbol_bits`.
    pub fn num_symbols(&self) -> u32 {
        1 << self.symbol_bits
    }

    /// Number of palette colors, `2^color_bits`.
    pub fn num_colors(&self) -> u32 {
        1 << self.color_bits
    }

    /// Number of distinct cell values, `2^(symbol_bits+color_bits)`.
    pub fn num_cell_values(&self) -> u32 {
        1 << (self.symbol_bits + self.color_bits)
    }

    /// `top_width = dimensions - 2*marker_size`, the width (in cells) of the
    /// top and bottom bands once both side markers are carved out.
    pub fn top_width(&self) -> u32 {
        self.dimensions - 2 * self.marker_size
    }

    /// Total cells a `GridWalker` built from this config will yield.
    pub fn cell_count(&self) -> u32 {
        let tw = self.top_width();
        tw * self.marker_size * 2 + self.dimensions * tw
    }

    /// Parse a config from a toml document; falls back to individually
    /// validating that `skip` doesn't divide the canonical frame dimensions,
    /// matching the scanner's precondition in the source material.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: CimbarConfig =
            toml::from_str(s).map_err(|e| CimbarError::InvalidArgument(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.skip == 0 || CANONICAL_SIZE % self.skip == 0 {
            return Err(CimbarError::InvalidArgument(format!(
                "skip={} must not divide the canonical frame size {}",
                self.skip, CANONICAL_SIZE
            )));
        }
        if self.num_colors() > 12 {
            return Err(CimbarError::InvalidArgument(format!(
                "no palette table for color_bits={}",
                self.color_bits
            )));
        }
        Ok(())
    }

    /// Load a config from a toml file on disk, falling back to defaults
    /// when the file doesn't exist.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
