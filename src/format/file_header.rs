//! The `ZISRAWFILE` segment: identifies the container and points at its
//! directory, metadata, and attachment-directory segments.

use uuid::Uuid;

use crate::error::EntryError;
use crate::io::source::Source;

pub const FILE_HEADER_BODY_SIZE: u64 = 80;

#[derive(Debug, Clone)]
pub struct FileHeader {
    pub major: i32,
    pub minor: i32,
    pub primary_file_guid: Uuid,
    pub file_guid: Uuid,
    pub file_part: i32,
    pub directory_position: i64,
    pub metadata_position: i64,
    pub update_pending: bool,
    pub attachment_directory_position: i64,
}

/// Decodes the FileHeader body starting at `offset` (immediately after the
/// 32-byte segment header).
pub fn decode_file_header(source: &Source, offset: u64) -> Result<FileHeader, EntryError> {
    let raw = source
        .read_at(offset, FILE_HEADER_BODY_SIZE as usize)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;

    let major = i32::from_le_bytes(raw[0..4].try_into().unwrap());
    let minor = i32::from_le_bytes(raw[4..8].try_into().unwrap());
    // bytes 8..16 reserved
    let primary_file_guid = Uuid::from_bytes(raw[16..32].try_into().unwrap());
    let file_guid = Uuid::from_bytes(raw[32..48].try_into().unwrap());
    let file_part = i32::from_le_bytes(raw[48..52].try_into().unwrap());
    let directory_position = i64::from_le_bytes(raw[52..60].try_into().unwrap());
    let metadata_position = i64::from_le_bytes(raw[60..68].try_into().unwrap());
    let update_pending = i32::from_le_bytes(raw[68..72].try_into().unwrap()) != 0;
    let attachment_directory_position = i64::from_le_bytes(raw[72..80].try_into().unwrap());

    Ok(FileHeader {
        major,
        minor,
        primary_file_guid,
        file_guid,
        file_part,
        directory_position,
        metadata_position,
        update_pending,
        attachment_directory_position,
    })
}
