//! The `ZISRAWATTDIR`/`ZISRAWATTACH` segments.
//!
//! Unlike FileHeader/DirectoryEntry/DimensionEntry, the attachment records
//! are not bit-exactly specified by the portable contract this reader
//! follows (see design note (d)): this module defines fixed-size,
//! reserved-padded records in the same read-skip spirit as the specified
//! segments. They are an internal convention for round-tripping a container
//! this crate has itself produced, not a claim about any other writer's
//! on-disk attachment layout.

use bytes::Bytes;
use uuid::Uuid;

use crate::error::EntryError;
use crate::io::source::Source;

pub const ATTACHMENT_DIRECTORY_HEADER_SIZE: u64 = 256;
pub const ATTACHMENT_ENTRY_SIZE: u64 = 256;
pub const ATTACHMENT_SEGMENT_HEADER_SIZE: u64 = 256;

#[derive(Debug, Clone)]
pub struct AttachmentEntry {
    pub content_guid: Uuid,
    pub content_type: String,
    pub name: String,
    pub file_position: i64,
    pub file_part: i32,
}

pub fn decode_attachment_directory_header(
    source: &Source,
    offset: u64,
) -> Result<(i32, u64), EntryError> {
    let raw = source
        .read_at(offset, 4)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;
    let entry_count = i32::from_le_bytes(raw[0..4].try_into().unwrap());
    Ok((entry_count, offset + ATTACHMENT_DIRECTORY_HEADER_SIZE))
}

pub fn decode_attachment_entry(
    source: &Source,
    offset: u64,
) -> Result<AttachmentEntry, EntryError> {
    let raw = source
        .read_at(offset, ATTACHMENT_ENTRY_SIZE as usize)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;

    let file_position = i64::from_le_bytes(raw[0..8].try_into().unwrap());
    let file_part = i32::from_le_bytes(raw[8..12].try_into().unwrap());
    let content_guid = Uuid::from_bytes(raw[12..28].try_into().unwrap());
    let content_type = String::from_utf8_lossy(&raw[28..36])
        .trim_end_matches('\0')
        .to_string();
    let name = String::from_utf8_lossy(&raw[36..116])
        .trim_end_matches('\0')
        .to_string();

    Ok(AttachmentEntry {
        content_guid,
        content_type,
        name,
        file_position,
        file_part,
    })
}

/// Reads the `used_size` bytes of an attachment's payload immediately
/// following its 256-byte segment header at `body_offset`.
pub fn read_attachment_payload(
    source: &Source,
    body_offset: u64,
    used_size: i64,
) -> Result<Bytes, EntryError> {
    source
        .read_at(
            body_offset + ATTACHMENT_SEGMENT_HEADER_SIZE,
            used_size as usize,
        )
        .map_err(|e| EntryError::Corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_entry_name_and_type() {
        let mut raw = vec![0u8; ATTACHMENT_ENTRY_SIZE as usize];
        raw[0..8].copy_from_slice(&128i64.to_le_bytes());
        raw[8..12].copy_from_slice(&0i32.to_le_bytes());
        raw[12..28].copy_from_slice(&[0xCC; 16]);
        raw[28..36].copy_from_slice(b"Label\0\0\0");
        raw[36..41].copy_from_slice(b"label");
        let source = Source::from_embedded("t", Bytes::from(raw));
        let entry = decode_attachment_entry(&source, 0).unwrap();
        assert_eq!(entry.content_type, "Label");
        assert_eq!(entry.name, "label");
        assert_eq!(entry.file_position, 128);
    }
}
