// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Full scan -> deskew -> decode round trip: render a clean frame with
//! four corner finder markers and one known payload cell, warp it through
//! an arbitrary perspective to simulate a photographed capture, then
//! detect, rectify and decode it back.

use cimbar_core::{
    scan_frame, CimbarConfig, Codec, ColorPalette, Deskewer, GridGeometry, GridWalker, TileLibrary,
};
use image::{imageops, Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

/// Mirrors `tile::test_support::synthetic_glyphs`: glyph `i` is a diagonal
/// stripe of thickness `i`, distinct enough to hash differently without a
/// real bitmap tile asset.
fn synthetic_glyphs(num_symbols: usize, size: u32) -> Vec<RgbaImage> {
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

/// Draw one 1:1:3:1:1 finder marker centered at `(cx, cy)` directly into
/// an RGBA canvas.
fn draw_marker(canvas: &mut RgbaImage, cx: i64, cy: i64, module: i64) {
    let half = module * 7 / 2;
    for dy in -half..=half {
        for dx in -half..=half {
            let x = cx + dx;
            let y = cy + dy;
            if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
                continue;
            }
            let ring = dx.abs().max(dy.abs()) / module;
            let v = if matches!(ring, 0 | 2) { 0 } else { 255 };
            canvas.put_pixel(x as u32, y as u32, Rgba([v, v, v, 255]));
        }
    }
}

#[test]
fn full_scan_deskew_decode_round_trip_through_a_perspective_warp() {
    let mut config = CimbarConfig::default();
    config.symbol_bits = 4;
    config.color_bits = 3;
    config.dark = false;
    config.spacing = 8; // one-to-one with the 8x8 synthetic glyph tiles
    config.dimensions = 128; // dimensions * spacing == CANONICAL_SIZE

    let palette = ColorPalette::new(config.dark, config.color_bits).unwrap();
    let glyphs = synthetic_glyphs(config.num_symbols() as usize, 8);
    let tiles = TileLibrary::from_images(&glyphs, &config, &palette).unwrap();
    let codec = Codec::new(config, tiles, palette);

    let canvas_size = config.dimensions * config.spacing;
    let mut canonical =
        RgbaImage::from_pixel(canvas_size, canvas_size, Rgba([255, 255, 255, 255]));

    let module = 8i64;
    let corners = [(28i64, 28i64), (996, 28), (28, 996), (996, 996)];
    for &(cx, cy) in &corners {
        draw_marker(&mut canonical, cx, cy, module);
    }

    let value = 0x17u32;
    let tile = codec.encode(value).unwrap();
    let geom = GridGeometry::from(codec.config());
    let top_band_len = geom.top_width() * geom.marker_size;
    // A cell well inside the middle band, away from both the markers and
    // the frame edges.
    let (px, py) = GridWalker::new(geom)
        .nth((top_band_len + 50) as usize)
        .unwrap();
    imageops::overlay(&mut canonical, tile, px as i64, py as i64);

    // Simulate a photographed capture: warp the clean canonical frame
    // through an arbitrary perspective onto a larger canvas.
    let src: [(f32, f32); 4] = [(28.0, 28.0), (996.0, 28.0), (28.0, 996.0), (996.0, 996.0)];
    let dst: [(f32, f32); 4] = [(40.0, 35.0), (980.0, 45.0), (35.0, 985.0), (1005.0, 1000.0)];
    let capture_projection = Projection::from_control_points(src, dst)
        .expect("four non-collinear correspondences always solve");
    let captured_size = 1060u32;
    let mut captured =
        RgbaImage::from_pixel(captured_size, captured_size, Rgba([255, 255, 255, 255]));
    warp_into(
        &canonical,
        &capture_projection,
        Interpolation::Bilinear,
        Rgba([255, 255, 255, 255]),
        &mut captured,
    );

    let gray = imageops::grayscale(&captured);
    let detected = scan_frame(&gray, config.dark, config.skip);
    assert!(
        detected.is_complete(),
        "expected exactly 4 finder markers, found {}",
        detected.anchors.len()
    );

    let deskewer = Deskewer::from_anchors(&detected.anchors).unwrap();
    let rectified = deskewer.rectify(&captured);

    let cell = imageops::crop_imm(&rectified, px, py, 8, 8).to_image();
    let decoded = codec.decode(&cell).unwrap();
    assert_eq!(decoded, value);
}
