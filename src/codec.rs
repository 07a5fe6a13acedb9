// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Maps between integer cell values and rendered/observed tile images.
//!
//! `Codec` owns an immutable `TileLibrary` and `ColorPalette` (built once,
//! the same lifecycle the teacher gives its `SymbolMap`) and exposes the
//! encode/decode operations of §4.3-4.4.

use crate::config::CimbarConfig;
use crate::error::{CimbarError, Result};
use crate::palette::ColorPalette;
use crate::tile::{hash_cell, TileLibrary};
use image::{GenericImageView, RgbaImage};

pub struct Codec {
    config: CimbarConfig,
    tiles: TileLibrary,
    palette: ColorPalette,
}

impl Codec {
    pub fn new(config: CimbarConfig, tiles: TileLibrary, palette: ColorPalette) -> Self {
        Codec {
            config,
            tiles,
            palette,
        }
    }

    pub fn config(&self) -> &CimbarConfig {
        &self.config
    }

    /// `encode(bits) -> tile`. Fails with `InvalidArgument` if
    /// `bits >= 2^(symbol_bits+color_bits)`.
    pub fn encode(&self, bits: u32) -> Result<&RgbaImage> {
        if bits >= self.config.num_cell_values() {
            return Err(CimbarError::InvalidArgument(format!(
                "bits={} out of range for {} cell values",
                bits,
                self.config.num_cell_values()
            )));
        }
        self.tiles.tinted_tile(bits, self.config.symbol_bits)
    }

    fn check_cell_size(&self, cell: &RgbaImage) -> Result<()> {
        let expected = self.tiles.tile_size();
        if cell.width() != expected || cell.height() != expected {
            return Err(CimbarError::MalformedImage(format!(
                "cell is {}x{}, expected {}x{}",
                cell.width(),
                cell.height(),
                expected,
                expected
            )));
        }
        Ok(())
    }

    /// Best-fit glyph index and its Hamming distance to the nearest hash.
    /// Never fails: the caller may threshold `distance` itself.
    pub fn decode_symbol(&self, cell: &RgbaImage) -> Result<(u32, u32)> {
        self.check_cell_size(cell)?;
        let cell_hash = hash_cell(cell);
        let mut best = 0usize;
        let mut best_distance = u32::MAX;
        for (i, h) in self.tiles.hashes().iter().enumerate() {
            let d = cell_hash.hamming(h);
            if d < best_distance {
                best_distance = d;
                best = i;
                if best_distance == 0 {
                    break;
                }
            }
        }
        Ok((best as u32, best_distance))
    }

    /// Nearest-palette index, already shifted into the color-bit field.
    /// Returns 0 unconditionally when `color_bits == 0`.
    pub fn decode_color(&self, cell: &RgbaImage) -> Result<u32> {
        self.check_cell_size(cell)?;
        if self.palette.is_empty() || self.config.color_bits == 0 {
            return Ok(0);
        }
        let (w, h) = (cell.width(), cell.height());
        if w < 2 || h < 2 {
            // no interior to sample once the 1px border is excluded
            return Ok(0);
        }
        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        let mut count = 0u64;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let p = cell.get_pixel(x, y);
                r += p[0] as u64;
                g += p[1] as u64;
                b += p[2] as u64;
                count += 1;
            }
        }
        let (mr, mg, mb) = (
            (r / count.max(1)) as u8,
            (g / count.max(1)) as u8,
            (b / count.max(1)) as u8,
        );
        let idx = self.palette.nearest(mr, mg, mb);
        Ok((idx as u32) << self.config.symbol_bits)
    }

    /// `v = decode_color(cell) | decode_symbol(cell).0`.
    pub fn decode(&self, cell: &RgbaImage) -> Result<u32> {
        let (symbol, _distance) = self.decode_symbol(cell)?;
        let color = self.decode_color(cell)?;
        Ok(color | symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::test_support::synthetic_glyphs;

    fn build_codec(symbol_bits: u32, color_bits: u32, dark: bool) -> Codec {
        let mut cfg = CimbarConfig::default();
        cfg.symbol_bits = symbol_bits;
        cfg.color_bits = color_bits;
        cfg.dark = dark;
        let palette = ColorPalette::new(dark, color_bits).unwrap();
        let glyphs = synthetic_glyphs(cfg.num_symbols() as usize, 8);
        let tiles = TileLibrary::from_images(&glyphs, &cfg, &palette).unwrap();
        Codec::new(cfg, tiles, palette)
    }

    #[test]
    fn clean_round_trip_over_all_cell_values() {
        let codec = build_codec(3, 2, false);
        for v in 0..codec.config().num_cell_values() {
            let tile = codec.encode(v).unwrap().clone();
            let decoded = codec.decode(&tile).unwrap();
            assert_eq!(decoded, v, "round trip failed for v={}", v);
        }
    }

    #[test]
    fn out_of_range_encode_is_invalid_argument() {
        let codec = build_codec(2, 1, false);
        let max = codec.config().num_cell_values();
        assert!(codec.encode(max).is_err());
        assert!(codec.encode(max - 1).is_ok());
    }

    #[test]
    fn decode_color_is_zero_when_color_bits_is_zero() {
        let codec = build_codec(3, 0, true);
        let tile = codec.encode(2).unwrap().clone();
        assert_eq!(codec.decode_color(&tile).unwrap(), 0);
    }

    #[test]
    fn decode_color_on_sentinel_fill_under_dark_mode() {
        // A tile tinted with palette index 0 under dark/color_bits=2 decodes
        // back to color bits 0 (palette boundary scenario, §8.5).
        let codec = build_codec(2, 2, true);
        let tile = codec.encode(0).unwrap().clone();
        assert_eq!(codec.decode_color(&tile).unwrap(), 0);
    }

    #[test]
    fn malformed_cell_size_is_rejected() {
        let codec = build_codec(2, 1, false);
        let wrong = RgbaImage::new(4, 4);
        assert!(codec.decode(&wrong).is_err());
    }
}
