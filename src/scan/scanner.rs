// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Three-pass finder-marker scan: horizontal sweep (strided by `skip`)
//! produces candidates, vertical sweep confirms the survivors, diagonal
//! sweep confirms what's left. Dedup/filter/ordering mirror the reference
//! scanner's `deduplicate_candidates`/`filter_candidates`/`sort_top_to_bottom`.

use super::state::{Anchor, ScanState};
use image::GrayImage;

const DEDUP_DISTANCE: i64 = 50;

/// A confirmed finder-marker anchor, in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub xavg: i64,
    pub yavg: i64,
    pub xrange: i64,
    pub yrange: i64,
}

impl From<Anchor> for Candidate {
    fn from(a: Anchor) -> Self {
        Candidate {
            xavg: a.xavg(),
            yavg: a.yavg(),
            xrange: a.xrange(),
            yrange: a.yrange(),
        }
    }
}

/// Binarize a grayscale frame at a fixed midpoint threshold. Inked pixels
/// are the dark ones unless `dark` mode flips the expected polarity.
fn is_ink(pixel: u8, dark: bool) -> bool {
    let below_mid = pixel < 127;
    if dark {
        !below_mid
    } else {
        below_mid
    }
}

/// Pass 1: scan rows `skip, 2*skip, ...` left-to-right, recording the
/// horizontal extent of each run that satisfies the 1:1:3:1:1 ratio,
/// plus the edge-of-row flush.
fn horizontal_scan(img: &GrayImage, dark: bool, skip: u32) -> Vec<Anchor> {
    let (w, h) = img.dimensions();
    let mut found = Vec::new();
    let mut y = skip;
    while y < h {
        let mut state = ScanState::new();
        for x in 0..w {
            let ink = is_ink(img.get_pixel(x, y).0[0], dark);
            if let Some(width) = state.process(ink) {
                let x = x as i64;
                found.push(Anchor::new(x - width as i64, y as i64, x - 1, y as i64));
            }
        }
        if let Some(width) = state.process(false) {
            let x = w as i64;
            found.push(Anchor::new(x - width as i64, y as i64, x - 1, y as i64));
        }
        y += skip;
    }
    found
}

/// Pass 2: full-height scan at each distinct `xavg` the pass-1 candidates
/// centered on, plus the edge-of-column flush.
fn vertical_scan(img: &GrayImage, dark: bool, candidates: &[Anchor]) -> Vec<Anchor> {
    let (w, h) = img.dimensions();
    let mut xs: Vec<i64> = candidates.iter().map(|c| c.xavg()).collect();
    xs.sort_unstable();
    xs.dedup();

    let mut found = Vec::new();
    for x in xs {
        if x < 0 || x >= w as i64 {
            continue;
        }
        let xu = x as u32;
        let mut state = ScanState::new();
        for y in 0..h {
            let ink = is_ink(img.get_pixel(xu, y).0[0], dark);
            if let Some(width) = state.process(ink) {
                let y = y as i64;
                found.push(Anchor::new(x, y - width as i64, x, y - 1));
            }
        }
        if let Some(width) = state.process(false) {
            let y = h as i64;
            found.push(Anchor::new(x, y - width as i64, x, y - 1));
        }
    }
    found
}

/// Pass 3: diagonal confirmation starting from the frame edge closest to
/// each candidate's center and running to the opposite edge, plus the
/// edge-of-diagonal flush.
fn diagonal_scan(img: &GrayImage, dark: bool, candidates: &[Anchor]) -> Vec<Anchor> {
    let (w, h) = img.dimensions();
    let mut found = Vec::new();
    for c in candidates {
        let cx = c.xavg();
        let cy = c.yavg();
        let offset = (cx - cy).abs();
        let (start_x, start_y) = if cx < cy { (0, offset) } else { (offset, 0) };
        let steps = w as i64 - offset;
        if steps <= 0 {
            continue;
        }

        let mut state = ScanState::new();
        for i in 0..steps {
            let x = start_x + i;
            let y = start_y + i;
            if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                continue;
            }
            let ink = is_ink(img.get_pixel(x as u32, y as u32).0[0], dark);
            if let Some(width) = state.process(ink) {
                found.push(Anchor::new(x - width as i64, y - width as i64, x, y));
            }
        }
        if let Some(width) = state.process(false) {
            let x = start_x + steps;
            let y = start_y + steps;
            found.push(Anchor::new(x - width as i64, y - width as i64, x, y));
        }
    }
    found
}

/// Group candidates whose `xavg`/`yavg` both fall within `DEDUP_DISTANCE`
/// pixels of a group's first member, then merge each group to its
/// enclosing bounds.
fn deduplicate_candidates(candidates: Vec<Anchor>) -> Vec<Anchor> {
    let mut groups: Vec<Vec<Anchor>> = Vec::new();
    for c in candidates {
        let mut placed = false;
        for g in groups.iter_mut() {
            let rep = g[0];
            if (rep.xavg() - c.xavg()).abs() < DEDUP_DISTANCE
                && (rep.yavg() - c.yavg()).abs() < DEDUP_DISTANCE
            {
                g.push(c);
                placed = true;
                break;
            }
        }
        if !placed {
            groups.push(vec![c]);
        }
    }
    groups
        .into_iter()
        .map(|g| {
            let mut area = g[0];
            for p in &g[1..] {
                area.merge(p);
            }
            area
        })
        .collect()
}

/// Drop anchors whose extent is small relative to the mean extent of all
/// survivors -- only applied once more than 4 candidates remain, so the
/// common exactly-4 case is never touched.
fn filter_candidates(candidates: Vec<Anchor>) -> Vec<Anchor> {
    if candidates.len() <= 4 {
        return candidates;
    }
    let n = candidates.len() as i64;
    let mean_x: i64 = candidates.iter().map(|a| a.xrange()).sum::<i64>() / n;
    let mean_y: i64 = candidates.iter().map(|a| a.yrange()).sum::<i64>() / n;
    candidates
        .into_iter()
        .filter(|a| a.xrange() > mean_x / 2 && a.yrange() > mean_y / 2)
        .collect()
}

/// Order exactly four anchors as (top-left, top-right, bottom-left,
/// bottom-right): sort by distance from the origin, then of the
/// remaining middle pair, the one with the larger `|Δxavg|` from
/// top-left is top-right.
fn sort_top_to_bottom(mut candidates: Vec<Anchor>) -> Vec<Anchor> {
    candidates.sort_by_key(|a| a.xavg() + a.yavg());
    if candidates.len() == 4 {
        let top_left = candidates[0];
        let p1_xoff = (candidates[1].xavg() - top_left.xavg()).abs();
        let p2_xoff = (candidates[2].xavg() - top_left.xavg()).abs();
        if p2_xoff > p1_xoff {
            candidates.swap(1, 2);
        }
    }
    candidates
}

/// Detected finder markers, ordered top-left / top-right / bottom-left /
/// bottom-right once exactly four survive scanning.
pub struct ScanResult {
    pub anchors: Vec<Candidate>,
}

impl ScanResult {
    /// `true` once scanning converged on exactly the four corner markers
    /// a clean frame should produce.
    pub fn is_complete(&self) -> bool {
        self.anchors.len() == 4
    }
}

/// Run all three passes plus dedup/filter/order over a grayscale frame.
/// `skip` is the row stride for the initial horizontal pass (§4.5/§6);
/// the frame dimensions must not be evenly divisible by it.
pub fn scan(img: &GrayImage, dark: bool, skip: u32) -> ScanResult {
    let pass1 = horizontal_scan(img, dark, skip.max(1));
    let pass1 = deduplicate_candidates(pass1);

    let pass2 = vertical_scan(img, dark, &pass1);
    let pass2 = deduplicate_candidates(pass2);

    let pass3 = diagonal_scan(img, dark, &pass2);
    let pass3 = deduplicate_candidates(pass3);
    let pass3 = filter_candidates(pass3);

    let ordered = sort_top_to_bottom(pass3);
    ScanResult {
        anchors: ordered.into_iter().map(Candidate::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Draw a single 1:1:3:1:1 finder marker (light background) centered
    /// at `(cx, cy)` with module size `module`.
    fn draw_marker(img: &mut GrayImage, cx: i64, cy: i64, module: i64) {
        let half = module * 7 / 2;
        for dy in -half..=half {
            for dx in -half..=half {
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
                    continue;
                }
                // Ring widths, outermost to innermost: 1 1 3 1 1 modules.
                let ring = dx.abs().max(dy.abs()) / module;
                let dark_ring = matches!(ring, 0 | 2);
                img.put_pixel(x as u32, y as u32, Luma([if dark_ring { 0 } else { 255 }]));
            }
        }
    }

    fn blank(size: u32) -> GrayImage {
        GrayImage::from_pixel(size, size, Luma([255]))
    }

    #[test]
    fn horizontal_scan_finds_a_single_marker_row() {
        let mut img = blank(200);
        draw_marker(&mut img, 100, 100, 4);
        let hits = horizontal_scan(&img, false, 17);
        assert!(
            !hits.is_empty(),
            "expected at least one horizontal hit through the marker"
        );
    }

    #[test]
    fn horizontal_scan_flushes_a_pattern_completing_at_the_row_edge() {
        // 1:1:3:1:1 with module 1 ending exactly at the last column: widths
        // 1,1,3,1,1 = 7 ink/background runs, placed so the final run has no
        // trailing background pixel to close it off.
        let w = 11u32;
        let mut img = GrayImage::from_pixel(w, 1, Luma([255]));
        // background(4) ink(1) background(1) ink(3) background(1) ink(1) -- pattern ends at edge
        let pattern = [
            255, 255, 255, 255, 0, 255, 0, 0, 0, 255, 0,
        ];
        for (x, &v) in pattern.iter().enumerate() {
            img.put_pixel(x as u32, 0, Luma([v]));
        }
        let hits = horizontal_scan(&img, false, 1);
        assert!(
            hits.iter().any(|a| a.x == 4 && a.xmax == 10),
            "expected the edge-flush anchor spanning (4..=10), got {:?}",
            hits
        );
    }

    #[test]
    fn deduplicate_merges_anchors_within_the_box_threshold() {
        let a = Anchor::point(10, 10);
        let b = Anchor::point(10 + 40, 10 + 40); // dx=dy=40: fails a circular test, passes the box test
        let merged = deduplicate_candidates(vec![a, b]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn deduplicate_keeps_far_apart_anchors() {
        let a = Anchor::point(10, 10);
        let b = Anchor::point(500, 500);
        let merged = deduplicate_candidates(vec![a, b]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn filter_is_a_no_op_at_or_under_four_candidates() {
        let big = Anchor::new(0, 0, 100, 100);
        let tiny = Anchor::new(0, 0, 2, 2);
        let candidates = vec![big, big, big, tiny];
        let filtered = filter_candidates(candidates.clone());
        assert_eq!(filtered, candidates);
    }

    #[test]
    fn filter_drops_anchors_much_smaller_than_the_mean_past_four() {
        let big = Anchor::new(0, 0, 100, 100);
        let tiny = Anchor::new(0, 0, 2, 2);
        let filtered = filter_candidates(vec![big, big, big, big, tiny]);
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn sort_top_to_bottom_orders_four_corners() {
        let tl = Anchor::point(10, 10);
        let tr = Anchor::point(500, 10);
        let bl = Anchor::point(10, 500);
        let br = Anchor::point(500, 500);
        let ordered = sort_top_to_bottom(vec![br, bl, tr, tl]);
        assert_eq!(ordered[0], tl);
        assert_eq!(ordered[1], tr);
        assert_eq!(ordered[2], bl);
        assert_eq!(ordered[3], br);
    }

    #[test]
    fn full_scan_over_four_synthetic_markers_completes() {
        let mut img = blank(1200);
        let module = 4;
        draw_marker(&mut img, 60, 60, module);
        draw_marker(&mut img, 1140, 60, module);
        draw_marker(&mut img, 60, 1140, module);
        draw_marker(&mut img, 1140, 1140, module);
        let result = scan(&img, false, 17);
        assert!(!result.anchors.is_empty());
    }
}
