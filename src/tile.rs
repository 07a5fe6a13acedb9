// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Glyph tile loading, palette tinting and perceptual hashing.
//!
//! Asset layout and pixel conventions follow §6 of the design doc: a tile
//! directory holds `{symbol_bits}/{i:02x}.png` RGBA images where
//! `(0,255,255,255)` pixels are glyph ink (tinted per palette color at
//! encoder-build time) and `(255,255,255,255)` pixels are background
//! (inverted to black in dark mode).

use crate::config::{CimbarConfig, TILE_SIZE};
use crate::error::{CimbarError, Result};
use crate::palette::ColorPalette;
use image::{Rgba, RgbaImage};
use log::{debug, warn};
use std::path::Path;

const GLYPH_SENTINEL: Rgba<u8> = Rgba([0, 255, 255, 255]);
const BACKGROUND_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BACKGROUND_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// 64-bit average-hash of an 8x8 grayscale downsample, compared by Hamming
/// distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerceptualHash(pub u64);

impl PerceptualHash {
    pub fn hamming(&self, other: &PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

/// Apply the replacement rules from §3/§6 to one tile: `(0,255,255,255)`
/// becomes `tint` (when given), `(255,255,255,255)` becomes black if `dark`.
fn replace_pixels(img: &RgbaImage, dark: bool, tint: Option<Rgba<u8>>) -> RgbaImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        if *p == GLYPH_SENTINEL {
            if let Some(t) = tint {
                *p = t;
            }
        } else if dark && *p == BACKGROUND_WHITE {
            *p = BACKGROUND_BLACK;
        }
    }
    out
}

/// 8x8 average-hash: downsample to 8x8 grayscale, compute mean, one bit
/// per pixel `(pixel > mean)`.
fn average_hash(img: &RgbaImage) -> PerceptualHash {
    let gray = image::imageops::resize(img, 8, 8, image::imageops::FilterType::Triangle);
    let mut samples = [0u8; 64];
    let mut sum: u32 = 0;
    for (i, p) in gray.pixels().enumerate() {
        let Rgba([r, g, b, _]) = *p;
        let lum = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) as u8;
        samples[i] = lum;
        sum += lum as u32;
    }
    let mean = (sum / 64) as u8;
    let mut bits: u64 = 0;
    for (i, &s) in samples.iter().enumerate() {
        if s > mean {
            bits |= 1 << i;
        }
    }
    PerceptualHash(bits)
}

/// The N = 2^symbol_bits glyph bitmaps, ready for encoding (tinted per
/// palette color) and decoding (one neutral hash per glyph).
pub struct TileLibrary {
    tile_size: u32,
    /// hashes[i] -> neutral-rendering hash of glyph i
    hashes: Vec<PerceptualHash>,
    /// tinted[c * num_symbols + i] -> tile for (color c, glyph i)
    tinted: Vec<RgbaImage>,
    num_symbols: usize,
    num_colors: usize,
}

impl TileLibrary {
    /// Build directly from in-memory glyph images (one per symbol
    /// identity, ordered `0..num_symbols`), e.g. a test fixture or an
    /// asset-bundling caller that already decoded the PNGs itself.
    pub fn from_images(
        images: &[RgbaImage],
        config: &CimbarConfig,
        palette: &ColorPalette,
    ) -> Result<Self> {
        let num_symbols = config.num_symbols() as usize;
        if images.len() != num_symbols {
            return Err(CimbarError::InvalidArgument(format!(
                "expected {} tile images, got {}",
                num_symbols,
                images.len()
            )));
        }
        let tile_size = images
            .first()
            .map(|img| img.width())
            .unwrap_or(TILE_SIZE);
        for img in images {
            if img.width() != tile_size || img.height() != tile_size {
                return Err(CimbarError::MalformedImage(format!(
                    "tile is {}x{}, expected a {}x{} square",
                    img.width(),
                    img.height(),
                    tile_size,
                    tile_size
                )));
            }
        }

        let hashes = images
            .iter()
            .map(|img| average_hash(&replace_pixels(img, config.dark, None)))
            .collect();

        let num_colors = palette.len();
        let mut tinted = Vec::with_capacity(num_colors * num_symbols);
        for c in 0..num_colors {
            let (r, g, b) = palette.color(c);
            let tint = Rgba([r, g, b, 255]);
            for img in images {
                tinted.push(replace_pixels(img, config.dark, Some(tint)));
            }
        }

        Ok(TileLibrary {
            tile_size,
            hashes,
            tinted,
            num_symbols,
            num_colors,
        })
    }

    /// Load tiles from `{assets_root}/bitmap/{symbol_bits}/{i:02x}.png`.
    pub fn load(
        assets_root: &Path,
        config: &CimbarConfig,
        palette: &ColorPalette,
    ) -> Result<Self> {
        let num_symbols = config.num_symbols() as usize;
        let mut images = Vec::with_capacity(num_symbols);
        for i in 0..num_symbols {
            let path = assets_root
                .join("bitmap")
                .join(config.symbol_bits.to_string())
                .join(format!("{:02x}.png", i));
            debug!("loading tile asset {}", path.display());
            let img = image::open(&path)
                .map_err(|e| CimbarError::AssetMissing(format!("{}: {}", path.display(), e)))?
                .into_rgba8();
            images.push(img);
        }
        Self::from_images(&images, config, palette)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    /// Tinted tile for cell value `bits = (c << symbol_bits) | i`.
    pub fn tinted_tile(&self, cell_value: u32, symbol_bits: u32) -> Result<&RgbaImage> {
        let color = (cell_value >> symbol_bits) as usize;
        let symbol = (cell_value & ((1 << symbol_bits) - 1)) as usize;
        if color >= self.num_colors || symbol >= self.num_symbols {
            return Err(CimbarError::InvalidArgument(format!(
                "cell value {} out of range",
                cell_value
            )));
        }
        Ok(&self.tinted[color * self.num_symbols + symbol])
    }

    /// Neutral-rendering hash for glyph `i`.
    pub fn hash(&self, i: usize) -> Result<PerceptualHash> {
        self.hashes.get(i).copied().ok_or_else(|| {
            warn!("symbol index {} out of range ({})", i, self.num_symbols);
            CimbarError::InvalidArgument(format!("symbol index {} out of range", i))
        })
    }

    pub fn hashes(&self) -> &[PerceptualHash] {
        &self.hashes
    }
}

/// Compute the average-hash of an arbitrary RGBA cell image, for decoding.
pub fn hash_cell(cell: &RgbaImage) -> PerceptualHash {
    average_hash(cell)
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgba, RgbaImage};

    /// A minimal synthetic glyph set: glyph `i` draws a diagonal stripe
    /// whose thickness is `i`, so distinct identities hash to distinct
    /// values without needing real bitmap-tile assets (out of scope, §1).
    pub fn synthetic_glyphs(num_symbols: usize, size: u32) -> Vec<RgbaImage> {
        (0..num_symbols)
            .map(|i| {
                let mut img = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
                let thickness = (i as u32 % size).max(1);
                for y in 0..size {
                    for x in 0..size {
                        if x < thickness && y >= x {
                            img.put_pixel(x, y, Rgba([0, 255, 255, 255]));
                        }
                    }
                }
                img
            })
            .collect()
    }
}
