//! Pyramid indexing: grouping directory entries into levels keyed by
//! `(pyramid_kind, ssX, ssY)` and maintaining each level's per-axis
//! bounding-box aggregates as tiles are folded in.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::EntryError;
use crate::format::dimension::Dimension;
use crate::format::directory::DirectoryEntry;
use crate::format::enums::{CompressionKind, PixelType, PyramidKind};

/// One pyramid level: all tiles sharing the same `(pyramid_kind, ssX, ssY)`.
#[derive(Debug)]
pub struct Level {
    pub pixel_type: PixelType,
    pub compression: CompressionKind,
    pub pyramid_kind: PyramidKind,
    pub ss_x: i32,
    pub ss_y: i32,
    pub start_min: HashMap<char, i32>,
    /// Tracked directly (rather than deriving `total_size` incrementally)
    /// because `start_min` can still move after later insertions; recomputing
    /// `total_size = max_end - start_min` from both aggregates avoids having
    /// to revisit every prior tile when the minimum shifts.
    max_end: HashMap<char, i32>,
    pub tiles: HashMap<[u8; 8], Tile>,
}

impl Level {
    fn new(entry: &DirectoryEntry, ss_x: i32, ss_y: i32) -> Self {
        Level {
            pixel_type: entry.pixel_type,
            compression: entry.compression,
            pyramid_kind: entry.pyramid_type,
            ss_x,
            ss_y,
            start_min: HashMap::new(),
            max_end: HashMap::new(),
            tiles: HashMap::new(),
        }
    }

    fn fold_in(&mut self, dimensions: &HashMap<char, Dimension>) {
        for (axis, dim) in dimensions {
            let end = dim.start + dim.size;
            self.start_min
                .entry(*axis)
                .and_modify(|m| *m = (*m).min(dim.start))
                .or_insert(dim.start);
            self.max_end
                .entry(*axis)
                .and_modify(|m| *m = (*m).max(end))
                .or_insert(end);
        }
    }

    /// `total_size[axis]`, per the spec's `max(start + size) - start_min`.
    pub fn total_size(&self, axis: char) -> i32 {
        match (self.start_min.get(&axis), self.max_end.get(&axis)) {
            (Some(start_min), Some(max_end)) => max_end - start_min,
            _ => 0,
        }
    }

    /// Whether some tile in this level carries a `dim[axis].size > 1`, i.e.
    /// a single sub-block spans more than one coordinate along `axis`. Not
    /// the same thing as `total_size(axis) > 1`: several tiles tiling an
    /// axis at distinct `size == 1` starts aggregate to a large span without
    /// any one of them being "multi" along that axis.
    pub fn is_multi(&self, axis: char) -> bool {
        self.tiles
            .values()
            .any(|tile| tile.dimensions.get(&axis).is_some_and(|dim| dim.size > 1))
    }
}

/// A single tile's location and decoded directory entry. Back-references to
/// its owning level and source are plain indices into the `Container`'s own
/// vectors, never pointers.
#[derive(Debug)]
pub struct Tile {
    pub source_index: usize,
    pub file_part: i32,
    /// Byte offset of the enclosing `ZISRAWSUBBLOCK` segment header.
    pub segment_offset: u64,
    pub key: [u8; 8],
    pub pixel_type: PixelType,
    pub compression: CompressionKind,
    pub pyramid_kind: PyramidKind,
    pub dimensions: HashMap<char, Dimension>,
    pub directory_size: i32,
    pub metadata_size: i32,
    pub data_size: i32,
    pub attachment_size: i32,
    pub cached_data: std::cell::RefCell<Option<Bytes>>,
}

/// Inserts a decoded `DirectoryEntry` into `levels`, creating a new `Level`
/// on first encounter of its `(pyramid_kind, ssX, ssY)` triple. Returns the
/// index of the level the tile was inserted into.
#[allow(clippy::too_many_arguments)]
pub fn insert_tile(
    levels: &mut Vec<Level>,
    entry: DirectoryEntry,
    source_index: usize,
    file_part: i32,
    segment_offset: u64,
    directory_size: i32,
    metadata_size: i32,
    data_size: i32,
    attachment_size: i32,
) -> Result<usize, EntryError> {
    let (ss_x, ss_y) = entry.subsampling()?;
    let key = entry.tile_key()?;

    let level_index = levels
        .iter()
        .position(|l| l.pyramid_kind == entry.pyramid_type && l.ss_x == ss_x && l.ss_y == ss_y)
        .unwrap_or_else(|| {
            levels.push(Level::new(&entry, ss_x, ss_y));
            levels.len() - 1
        });

    let level = &mut levels[level_index];
    level.fold_in(&entry.dimensions);

    if level.tiles.contains_key(&key) {
        return Err(EntryError::DuplicateTile { level: level_index });
    }

    level.tiles.insert(
        key,
        Tile {
            source_index,
            file_part,
            segment_offset,
            key,
            pixel_type: entry.pixel_type,
            compression: entry.compression,
            pyramid_kind: entry.pyramid_type,
            dimensions: entry.dimensions,
            directory_size,
            metadata_size,
            data_size,
            attachment_size,
            cached_data: std::cell::RefCell::new(None),
        },
    );

    Ok(level_index)
}
