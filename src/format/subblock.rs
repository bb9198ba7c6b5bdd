//! The `ZISRAWSUBBLOCK` segment body: a local header giving the byte sizes
//! of the directory-entry copy, metadata, data, and attachment sections
//! that follow within the segment.
//!
//! Like the attachment records (see [`crate::format::attachment`]), the
//! portable contract this reader follows pins down only the 32-byte segment
//! header for `ZISRAWSUBBLOCK`, not its body. This module defines a small
//! fixed-size local header in the same spirit, read once per tile during
//! the directory walk so later `load_tile` calls know exactly where the
//! pixel payload starts without re-deriving it.
//!
//! Layout from the start of the segment (`segment_offset`): 32-byte segment
//! header, then this 32-byte local header (only the first 16 bytes used),
//! then the directory-entry copy (`directory_size` bytes), then metadata
//! (`metadata_size` bytes), then pixel data (`data_size` bytes), then the
//! attachment (`attachment_size` bytes).

use crate::error::EntryError;
use crate::io::source::Source;

pub const SUBBLOCK_LOCAL_HEADER_SIZE: u64 = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct SubBlockLocalHeader {
    pub directory_size: i32,
    pub metadata_size: i32,
    pub attachment_size: i32,
    pub data_size: i32,
}

/// Decodes the local header at `segment_offset + 32` (immediately after the
/// segment's 32-byte universal header).
pub fn decode_subblock_local_header(
    source: &Source,
    segment_offset: u64,
) -> Result<SubBlockLocalHeader, EntryError> {
    let offset = segment_offset + 32;
    let raw = source
        .read_at(offset, 16)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;
    Ok(SubBlockLocalHeader {
        directory_size: i32::from_le_bytes(raw[0..4].try_into().unwrap()),
        metadata_size: i32::from_le_bytes(raw[4..8].try_into().unwrap()),
        attachment_size: i32::from_le_bytes(raw[8..12].try_into().unwrap()),
        data_size: i32::from_le_bytes(raw[12..16].try_into().unwrap()),
    })
}
