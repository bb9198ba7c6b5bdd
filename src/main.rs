//! zisraw-dump - a diagnostic CLI for inspecting ZISRAW/CZI containers.
//!
//! This binary opens a container, walks its pyramid, and prints a
//! human-readable (or `--json`) report. It exercises the library the way an
//! integrator would: nothing here is part of the query contract itself.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zisraw_reader::config::{Cli, Command, DumpConfig, ProbeConfig};
use zisraw_reader::container::{Container, OpenOptions};
use zisraw_reader::diagnostics::{dump_capabilities, dump_file_headers, dump_pyramid};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.into_command() {
        Command::Dump(config) => run_dump(config),
        Command::Probe(config) => run_probe(config),
    }
}

fn run_dump(config: DumpConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner();
    info!("Opening {}", config.path.display());

    let container = match Container::open(
        &config.path,
        OpenOptions {
            lenient: config.lenient,
        },
    ) {
        Ok(container) => container,
        Err(e) => {
            error!("Failed to open container: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        println!("{}", build_json_report(&container, config.max_entries));
    } else {
        print_text_report(&container, config.max_entries);
    }

    ExitCode::SUCCESS
}

fn run_probe(config: ProbeConfig) -> ExitCode {
    match Container::is_zisraw(&config.path) {
        Ok(true) => {
            println!("{}: ZISRAW container", config.path.display());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("{}: not a ZISRAW container", config.path.display());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Failed to probe {}: {}", config.path.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn print_text_report(container: &Container, max_entries: usize) {
    println!("────────────────────────────────────────────────────────────────");
    println!("File headers");
    println!("────────────────────────────────────────────────────────────────");
    print!("{}", dump_file_headers(container));

    println!("────────────────────────────────────────────────────────────────");
    println!("Pyramid ({} level(s))", container.level_count());
    println!("────────────────────────────────────────────────────────────────");
    print!("{}", dump_pyramid(container));

    println!("────────────────────────────────────────────────────────────────");
    println!("Capabilities");
    println!("────────────────────────────────────────────────────────────────");
    print!("{}", dump_capabilities(container));

    println!("────────────────────────────────────────────────────────────────");
    println!("Metadata entries: {}", container.metadata_count());

    for level_index in 0..container.level_count() {
        let tiles = container
            .level_tiles(level_index)
            .expect("index bounded by level_count");
        println!();
        println!("level[{level_index}] tiles (showing up to {max_entries}):");
        for tile in tiles.iter().take(max_entries) {
            println!(
                "  ({:>6}, {:>6}) {}x{}  {}  {}",
                tile.start_x,
                tile.start_y,
                tile.size_x,
                tile.size_y,
                tile.pixel_type.name(),
                tile.compression.name()
            );
        }
        if tiles.len() > max_entries {
            println!("  ... and {} more", tiles.len() - max_entries);
        }
    }
}

fn build_json_report(container: &Container, max_entries: usize) -> String {
    let caps = container.capabilities();
    let levels: Vec<_> = (0..container.level_count())
        .map(|index| {
            let level = container.level(index).expect("index bounded by level_count");
            let tiles = container
                .level_tiles(index)
                .expect("index bounded by level_count");
            let sample: Vec<_> = tiles
                .iter()
                .take(max_entries)
                .map(|tile| {
                    serde_json::json!({
                        "start_x": tile.start_x,
                        "start_y": tile.start_y,
                        "size_x": tile.size_x,
                        "size_y": tile.size_y,
                        "pixel_type": tile.pixel_type.name(),
                        "compression": tile.compression.name(),
                    })
                })
                .collect();
            serde_json::json!({
                "pixel_type": level.pixel_type.name(),
                "compression": level.compression.name(),
                "pyramid_kind": level.pyramid_kind.name(),
                "ss_x": level.ss_x,
                "ss_y": level.ss_y,
                "tile_count": tiles.len(),
                "tiles": sample,
            })
        })
        .collect();

    let report = serde_json::json!({
        "source_count": container.source_count(),
        "metadata_count": container.metadata_count(),
        "capabilities": {
            "multi_view": caps.multi_view,
            "multi_phase": caps.multi_phase,
            "multi_block": caps.multi_block,
            "multi_illumination": caps.multi_illumination,
            "multi_scene": caps.multi_scene,
            "multi_rotation": caps.multi_rotation,
            "multi_time": caps.multi_time,
            "multi_zslice": caps.multi_zslice,
            "multi_channel": caps.multi_channel,
            "has_uncompressed": caps.has_uncompressed,
            "has_jpeg": caps.has_jpeg,
            "has_jpeg_xr": caps.has_jpeg_xr,
            "has_lzw": caps.has_lzw,
            "has_camera_spec": caps.has_camera_spec,
            "has_system_spec": caps.has_system_spec,
        },
        "levels": levels,
    });
    serde_json::to_string_pretty(&report).unwrap()
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!("zisraw-dump v{}", version);
    info!("");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "zisraw_reader=debug"
    } else {
        "zisraw_reader=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
