//! The `ZISRAWSUBBLOCK` directory: a flat list of `DirectoryEntry` records,
//! each describing one tile's location, pixel layout, and dimensions.

use std::collections::HashMap;

use crate::error::EntryError;
use crate::format::dimension::{decode_dimension, Dimension, DimensionPolicy, DIMENSION_ENTRY_SIZE};
use crate::format::enums::{CompressionKind, PixelType, PyramidKind};
use crate::io::source::Source;

pub const DIRECTORY_HEADER_SIZE: u64 = 128;
pub const DIRECTORY_ENTRY_FIXED_SIZE: u64 = 24;

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub schema: u16,
    pub pixel_type: PixelType,
    pub file_position: i64,
    pub file_part: i32,
    pub compression: CompressionKind,
    pub pyramid_type: PyramidKind,
    pub dimensions: HashMap<char, Dimension>,
}

impl DirectoryEntry {
    pub fn dimension(&self, axis: char) -> Option<&Dimension> {
        self.dimensions.get(&axis)
    }

    /// (ssX, ssY) derived from the X and Y dimensions; both must be present.
    pub fn subsampling(&self) -> Result<(i32, i32), EntryError> {
        let x = self
            .dimension('X')
            .ok_or_else(|| EntryError::Corrupt("directory entry missing X dimension".into()))?;
        let y = self
            .dimension('Y')
            .ok_or_else(|| EntryError::Corrupt("directory entry missing Y dimension".into()))?;
        Ok((x.subsampling()?, y.subsampling()?))
    }

    /// 8-byte tile identifier: little-endian X-start concatenated with
    /// little-endian Y-start. Unique only within the owning level.
    pub fn tile_key(&self) -> Result<[u8; 8], EntryError> {
        let x = self
            .dimension('X')
            .ok_or_else(|| EntryError::Corrupt("directory entry missing X dimension".into()))?;
        let y = self
            .dimension('Y')
            .ok_or_else(|| EntryError::Corrupt("directory entry missing Y dimension".into()))?;
        let mut key = [0u8; 8];
        key[0..4].copy_from_slice(&x.start.to_le_bytes());
        key[4..8].copy_from_slice(&y.start.to_le_bytes());
        Ok(key)
    }
}

/// Decodes `entry_count` at `offset`, returning it along with the offset of
/// the first `DirectoryEntry`.
pub fn decode_directory_header(source: &Source, offset: u64) -> Result<(i32, u64), EntryError> {
    let raw = source
        .read_at(offset, 4)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;
    let entry_count = i32::from_le_bytes(raw[0..4].try_into().unwrap());
    Ok((entry_count, offset + DIRECTORY_HEADER_SIZE))
}

/// Decodes one `DirectoryEntry` at `offset`, returning it along with the
/// offset immediately following it.
pub fn decode_directory_entry(
    source: &Source,
    offset: u64,
    policy: DimensionPolicy,
) -> Result<(DirectoryEntry, u64), EntryError> {
    let raw = source
        .read_at(offset, DIRECTORY_ENTRY_FIXED_SIZE as usize)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;

    let schema = u16::from_le_bytes(raw[0..2].try_into().unwrap());
    let pixel_type = PixelType::from_code(i32::from_le_bytes(raw[2..6].try_into().unwrap()));
    let file_position = i64::from_le_bytes(raw[6..14].try_into().unwrap());
    let file_part = i32::from_le_bytes(raw[14..18].try_into().unwrap());
    let compression =
        CompressionKind::from_code(i32::from_le_bytes(raw[18..22].try_into().unwrap()));
    let pyramid_type = PyramidKind::from_code(raw[22]);
    // raw[23] plus 4 reserved bytes follow before dimension_count; see layout below.
    let dim_count_raw = source
        .read_at(offset + DIRECTORY_ENTRY_FIXED_SIZE + 4, 4)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;
    let dimension_count = i32::from_le_bytes(dim_count_raw[0..4].try_into().unwrap());
    if dimension_count < 0 {
        return Err(EntryError::Corrupt(format!(
            "negative dimension_count {dimension_count}"
        )));
    }

    let mut cursor = offset + DIRECTORY_ENTRY_FIXED_SIZE + 8;
    let mut dimensions = HashMap::new();
    for _ in 0..dimension_count {
        if let Some(dim) = decode_dimension(source, cursor, policy)? {
            dimensions.insert(dim.axis, dim);
        }
        cursor += DIMENSION_ENTRY_SIZE;
    }

    if !dimensions.contains_key(&'X') || !dimensions.contains_key(&'Y') {
        return Err(EntryError::Corrupt(
            "directory entry missing required X or Y dimension".into(),
        ));
    }

    Ok((
        DirectoryEntry {
            schema,
            pixel_type,
            file_position,
            file_part,
            compression,
            pyramid_type,
            dimensions,
        },
        cursor,
    ))
}
