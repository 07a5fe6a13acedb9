// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Perspective rectification: map the four detected corner-marker
//! centers onto the canonical square so the grid walker can assume a
//! fixed, undistorted geometry downstream.

use crate::config::CANONICAL_SIZE;
use crate::error::{CimbarError, Result};
use crate::scan::Candidate;
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

/// Inset (in canonical pixels) of each marker center from its frame
/// corner, matching the reference deskewer's destination quad.
const CORNER_INSET: f32 = 28.0;

fn canonical_corners() -> [(f32, f32); 4] {
    let far = CANONICAL_SIZE as f32 - CORNER_INSET;
    [
        (CORNER_INSET, CORNER_INSET), // top-left
        (far, CORNER_INSET),          // top-right
        (CORNER_INSET, far),          // bottom-left
        (far, far),                   // bottom-right
    ]
}

/// Rectifies a photographed frame to a fixed `CANONICAL_SIZE`-square
/// image given the four ordered marker anchors (top-left, top-right,
/// bottom-left, bottom-right, as `scan::scan` returns them).
pub struct Deskewer {
    projection: Projection,
}

impl Deskewer {
    /// Build the forward mapping from source marker centers to the
    /// canonical square. `anchors` must already be ordered TL/TR/BL/BR.
    pub fn from_anchors(anchors: &[Candidate]) -> Result<Self> {
        if anchors.len() != 4 {
            return Err(CimbarError::DetectionFailed(format!(
                "need exactly 4 ordered anchors to deskew, got {}",
                anchors.len()
            )));
        }
        let src: [(f32, f32); 4] = [
            (anchors[0].xavg as f32, anchors[0].yavg as f32),
            (anchors[1].xavg as f32, anchors[1].yavg as f32),
            (anchors[2].xavg as f32, anchors[2].yavg as f32),
            (anchors[3].xavg as f32, anchors[3].yavg as f32),
        ];
        let dst = canonical_corners();
        let projection = Projection::from_control_points(src, dst).ok_or_else(|| {
            CimbarError::DetectionFailed(
                "anchor quad is degenerate; cannot solve a perspective transform".to_string(),
            )
        })?;
        Ok(Deskewer { projection })
    }

    /// Warp `frame` into a fresh `CANONICAL_SIZE`-square image. Pixels
    /// with no source coverage are filled white.
    pub fn rectify(&self, frame: &RgbaImage) -> RgbaImage {
        let mut canvas =
            RgbaImage::from_pixel(CANONICAL_SIZE, CANONICAL_SIZE, Rgba([255, 255, 255, 255]));
        warp_into(
            frame,
            &self.projection,
            Interpolation::Bilinear,
            Rgba([255, 255, 255, 255]),
            &mut canvas,
        );
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Candidate;

    fn anchor(xavg: i64, yavg: i64) -> Candidate {
        Candidate {
            xavg,
            yavg,
            xrange: 4,
            yrange: 4,
        }
    }

    #[test]
    fn rejects_wrong_anchor_count() {
        let anchors = vec![anchor(0, 0), anchor(100, 0)];
        assert!(Deskewer::from_anchors(&anchors).is_err());
    }

    #[test]
    fn builds_from_a_clean_square_quad() {
        let anchors = vec![
            anchor(50, 50),
            anchor(950, 50),
            anchor(50, 950),
            anchor(950, 950),
        ];
        assert!(Deskewer::from_anchors(&anchors).is_ok());
    }

    #[test]
    fn rejects_degenerate_collinear_quad() {
        let anchors = vec![
            anchor(0, 0),
            anchor(10, 0),
            anchor(20, 0),
            anchor(30, 0),
        ];
        assert!(Deskewer::from_anchors(&anchors).is_err());
    }

    #[test]
    fn rectify_produces_a_canonical_square() {
        let anchors = vec![
            anchor(50, 50),
            anchor(950, 50),
            anchor(50, 950),
            anchor(950, 950),
        ];
        let deskewer = Deskewer::from_anchors(&anchors).unwrap();
        let frame = RgbaImage::from_pixel(1000, 1000, Rgba([10, 20, 30, 255]));
        let rectified = deskewer.rectify(&frame);
        assert_eq!(rectified.width(), CANONICAL_SIZE);
        assert_eq!(rectified.height(), CANONICAL_SIZE);
    }
}
