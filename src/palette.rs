// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Palette tables and nearest-color lookup.
//!
//! Color distance is CIE76 (Euclidean distance in L*a*b*), the same formula
//! the style module uses in `delta_e_cie76` — reimplemented here directly on
//! top of the `lab` crate (as `tools/tpetii` and `tools/petii` do for their
//! own color matching) rather than pulling in the full multi-colorspace
//! `ColorPro` machinery, which this crate has no other use for.

use crate::error::{CimbarError, Result};
use lab::Lab;

pub type RgbColor = (u8, u8, u8);

const LIGHT: [RgbColor; 8] = [
    (0x00, 0x00, 0x00),
    (0xFF, 0x00, 0xFF),
    (0x00, 0xFF, 0xFF),
    (0xFF, 0x9F, 0x00),
    (0x00, 0xFF, 0x00),
    (0xFF, 0x00, 0x00),
    (0x00, 0x00, 0xFF),
    (0x7F, 0x00, 0xFF),
];

const DARK_LOW: [RgbColor; 4] = [
    (0x00, 0xFF, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0xFF, 0x00, 0xFF),
    (0x00, 0xFF, 0x00),
];

const DARK_HIGH: [RgbColor; 12] = [
    (0x00, 0xFF, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0xFF, 0x6F, 0xFF),
    (0x00, 0xFF, 0x00),
    (0x00, 0x7F, 0xFF),
    (0xFF, 0xFF, 0xFF),
    (0xFF, 0x41, 0x41),
    (0xFF, 0x9F, 0x00),
    (0x7F, 0x00, 0xFF),
    (0xFF, 0x00, 0x7F),
    (0x7F, 0xFF, 0x00),
    (0x00, 0xFF, 0x7F),
];

fn table(dark: bool, color_bits: u32) -> &'static [RgbColor] {
    if !dark {
        &LIGHT
    } else if color_bits < 3 {
        &DARK_LOW
    } else {
        &DARK_HIGH
    }
}

/// Euclidean distance between two Lab colors (CIE76 delta-E).
fn delta_e_1976(l1: Lab, l2: Lab) -> f32 {
    ((l1.l - l2.l).powi(2) + (l1.a - l2.a).powi(2) + (l1.b - l2.b).powi(2)).sqrt()
}

/// Max-channel normalization applied before Lab conversion, per the
/// reference decoder's `_best_color`.
fn normalize(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let max_val = r.max(g).max(b).max(1) as f32;
    let adjust = 255.0 / max_val;
    let fix = |c: u8| (c as f32 * adjust).round().clamp(0.0, 255.0) as u8;
    (fix(r), fix(g), fix(b))
}

#[derive(Debug, Clone)]
pub struct ColorPalette {
    dark: bool,
    colors: Vec<RgbColor>,
    labs: Vec<Lab>,
}

impl ColorPalette {
    /// Build the palette for `(dark, color_bits)`. `color_bits` must have a
    /// table with at least `2^color_bits` entries (§6).
    pub fn new(dark: bool, color_bits: u32) -> Result<Self> {
        let n = 1usize << color_bits;
        let src = table(dark, color_bits);
        if n > src.len() {
            return Err(CimbarError::InvalidArgument(format!(
                "no palette table covers color_bits={}",
                color_bits
            )));
        }
        let colors: Vec<RgbColor> = src[..n].to_vec();
        let labs = colors
            .iter()
            .map(|&(r, g, b)| Lab::from_rgb(&[r, g, b]))
            .collect();
        Ok(ColorPalette {
            dark,
            colors,
            labs,
        })
    }

    pub fn dark(&self) -> bool {
        self.dark
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> RgbColor {
        self.colors[index]
    }

    /// Index of the palette entry nearest `(r, g, b)` under CIE76 ΔE, after
    /// max-channel normalization.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> usize {
        let (nr, ng, nb) = normalize(r, g, b);
        let sample = Lab::from_rgb(&[nr, ng, nb]);

        let mut best = 0;
        let mut best_dist = f32::MAX;
        for (i, lab) in self.labs.iter().enumerate() {
            let d = delta_e_1976(sample, *lab);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }
}
