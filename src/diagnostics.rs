//! Human-readable dumps of an open container: headers, directory entries,
//! and the pyramid levels they were folded into. Advisory only — nothing
//! here is part of the query contract in [`crate::container`].

use std::fmt::Write as _;

use crate::container::Container;

/// Renders a one-line-per-field summary of every source's file header.
pub fn dump_file_headers(container: &Container) -> String {
    let mut out = String::new();
    for index in 0..container.source_count() {
        let header = container
            .file_header(index)
            .expect("index bounded by source_count");
        writeln!(out, "source[{index}]").unwrap();
        writeln!(out, "  version:        {}.{}", header.major, header.minor).unwrap();
        writeln!(out, "  primary guid:   {}", header.primary_file_guid).unwrap();
        writeln!(out, "  file guid:      {}", header.file_guid).unwrap();
        writeln!(out, "  file part:      {}", header.file_part).unwrap();
        writeln!(out, "  directory at:   {}", header.directory_position).unwrap();
        writeln!(out, "  metadata at:    {}", header.metadata_position).unwrap();
        writeln!(
            out,
            "  attachments at: {}",
            header.attachment_directory_position
        )
        .unwrap();
    }
    out
}

/// Renders the pyramid: one block per level, tile count and per-axis extent.
pub fn dump_pyramid(container: &Container) -> String {
    let mut out = String::new();
    for index in 0..container.level_count() {
        let level = container.level(index).expect("index bounded by level_count");
        let tiles = container
            .level_tiles(index)
            .expect("index bounded by level_count");
        writeln!(
            out,
            "level[{index}]  pixel_type={:?}  compression={:?}  pyramid={:?}  ss=({}, {})",
            level.pixel_type, level.compression, level.pyramid_kind, level.ss_x, level.ss_y
        )
        .unwrap();
        writeln!(out, "  tiles: {}", tiles.len()).unwrap();
        for axis in ['X', 'Y', 'S', 'T', 'Z', 'C'] {
            let size = level.total_size(axis);
            if size > 0 {
                writeln!(out, "  {axis}: {size}").unwrap();
            }
        }
    }
    out
}

/// Renders the derived capability flags, one per line.
pub fn dump_capabilities(container: &Container) -> String {
    let caps = container.capabilities();
    format!(
        "multi_view={} multi_phase={} multi_block={} multi_illumination={} \
multi_scene={} multi_rotation={} multi_time={} multi_zslice={} multi_channel={}\n\
uncompressed={} jpeg={} jpeg_xr={} lzw={} camera_spec={} system_spec={}\n",
        caps.multi_view,
        caps.multi_phase,
        caps.multi_block,
        caps.multi_illumination,
        caps.multi_scene,
        caps.multi_rotation,
        caps.multi_time,
        caps.multi_zslice,
        caps.multi_channel,
        caps.has_uncompressed,
        caps.has_jpeg,
        caps.has_jpeg_xr,
        caps.has_lzw,
        caps.has_camera_spec,
        caps.has_system_spec,
    )
}
