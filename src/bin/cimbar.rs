// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Command-line front end for the codec/scanner pipeline.
//!
//! USAGE:
//!     cimbar encode <ASSETS_DIR> <OUT_PNG> <HEX_PAYLOAD> [CONFIG_TOML]
//!     cimbar decode <ASSETS_DIR> <IN_PNG> [CONFIG_TOML]
//!     cimbar deskew <IN_PNG> <OUT_PNG> [CONFIG_TOML]

use cimbar_core::{CimbarConfig, Codec, ColorPalette, Deskewer, GridGeometry, GridWalker, TileLibrary};
use log::LevelFilter;
use std::env;
use std::path::Path;

fn print_usage() {
    println!("cimbar - color-bitmap tile codec and scan/deskew pipeline");
    println!();
    println!("USAGE:");
    println!("    cimbar encode <ASSETS_DIR> <OUT_PNG> <HEX_PAYLOAD> [CONFIG_TOML]");
    println!("    cimbar decode <ASSETS_DIR> <IN_PNG> [CONFIG_TOML]");
    println!("    cimbar deskew <IN_PNG> <OUT_PNG> [CONFIG_TOML]");
    println!();
    println!("ARGUMENTS:");
    println!("    ASSETS_DIR    directory holding bitmap/<symbol_bits>/<NN>.png glyph tiles");
    println!("    OUT_PNG       output image path");
    println!("    IN_PNG        input image path");
    println!("    HEX_PAYLOAD   payload bytes as hex, one cell value per byte pair");
    println!("    CONFIG_TOML   optional pipeline config file (defaults if absent)");
}

fn load_config(path: Option<&String>) -> CimbarConfig {
    match path {
        Some(p) => CimbarConfig::load(Path::new(p)).unwrap_or_else(|e| {
            eprintln!("Error: invalid config '{}': {}", p, e);
            std::process::exit(1);
        }),
        None => CimbarConfig::default(),
    }
}

fn build_codec(assets_dir: &str, config: CimbarConfig) -> Codec {
    let palette = ColorPalette::new(config.dark, config.color_bits).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let tiles = TileLibrary::load(Path::new(assets_dir), &config, &palette).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    Codec::new(config, tiles, palette)
}

fn parse_hex_payload(hex: &str) -> Vec<u32> {
    if hex.len() % 2 != 0 {
        eprintln!("Error: HEX_PAYLOAD must have an even number of digits");
        std::process::exit(1);
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u32::from_str_radix(&hex[i..i + 2], 16).unwrap_or_else(|_| {
                eprintln!("Error: invalid hex byte '{}'", &hex[i..i + 2]);
                std::process::exit(1);
            })
        })
        .collect()
}

fn cmd_encode(args: &[String]) {
    if args.len() < 3 {
        eprintln!("Error: encode requires ASSETS_DIR, OUT_PNG and HEX_PAYLOAD");
        print_usage();
        std::process::exit(1);
    }
    let assets_dir = &args[0];
    let out_png = &args[1];
    let hex_payload = &args[2];
    let config = load_config(args.get(3));

    let codec = build_codec(assets_dir, config);
    let geom = GridGeometry::from(codec.config());
    let values = parse_hex_payload(hex_payload);

    let tile_size = codec.config().spacing;
    let canvas_size = codec.config().dimensions * tile_size;
    let mut canvas = image::RgbaImage::from_pixel(
        canvas_size,
        canvas_size,
        image::Rgba([255, 255, 255, 255]),
    );

    for ((x, y), &value) in GridWalker::new(geom).zip(values.iter().cycle()) {
        let tile = codec.encode(value).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        image::imageops::overlay(&mut canvas, tile, x as i64, y as i64);
    }

    canvas.save(out_png).unwrap_or_else(|e| {
        eprintln!("Error: failed to save '{}': {}", out_png, e);
        std::process::exit(1);
    });
    println!("wrote {}", out_png);
}

fn cmd_decode(args: &[String]) {
    if args.len() < 2 {
        eprintln!("Error: decode requires ASSETS_DIR and IN_PNG");
        print_usage();
        std::process::exit(1);
    }
    let assets_dir = &args[0];
    let in_png = &args[1];
    let config = load_config(args.get(2));

    let codec = build_codec(assets_dir, config);
    let geom = GridGeometry::from(codec.config());
    let tile_size = codec.config().spacing;

    let frame = image::open(in_png)
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to open '{}': {}", in_png, e);
            std::process::exit(1);
        })
        .into_rgba8();

    let mut out = String::new();
    for (x, y) in GridWalker::new(geom) {
        let cell = image::imageops::crop_imm(&frame, x, y, tile_size, tile_size).to_image();
        let value = codec.decode(&cell).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        out.push_str(&format!("{:02x}", value));
    }
    println!("{}", out);
}

fn cmd_deskew(args: &[String]) {
    if args.len() < 2 {
        eprintln!("Error: deskew requires IN_PNG and OUT_PNG");
        print_usage();
        std::process::exit(1);
    }
    let in_png = &args[0];
    let out_png = &args[1];
    let config = load_config(args.get(2));

    let frame = image::open(in_png)
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to open '{}': {}", in_png, e);
            std::process::exit(1);
        })
        .into_rgba8();
    let gray = image::imageops::grayscale(&frame);

    let result = cimbar_core::scan_frame(&gray, config.dark, config.skip);
    if !result.is_complete() {
        eprintln!(
            "Error: detected {} finder markers, need exactly 4",
            result.anchors.len()
        );
        std::process::exit(1);
    }

    let deskewer = Deskewer::from_anchors(&result.anchors).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let rectified = deskewer.rectify(&frame);
    rectified.save(out_png).unwrap_or_else(|e| {
        eprintln!("Error: failed to save '{}': {}", out_png, e);
        std::process::exit(1);
    });
    println!("wrote {}", out_png);
}

fn main() {
    cimbar_core::log::init_log(LevelFilter::Info, "cimbar.log");

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || matches!(args[1].as_str(), "--help" | "-h" | "help") {
        print_usage();
        if args.len() < 2 {
            std::process::exit(1);
        }
        return;
    }

    let rest = &args[2..];
    match args[1].as_str() {
        "encode" => cmd_encode(rest),
        "decode" => cmd_decode(rest),
        "deskew" => cmd_deskew(rest),
        other => {
            eprintln!("Error: unknown subcommand '{}'", other);
            print_usage();
            std::process::exit(1);
        }
    }
}
