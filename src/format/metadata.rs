//! The `ZISRAWMETADATA` segment: an XML document plus an optional
//! attachment blob, recorded by size and offset only at parse time.

use bytes::Bytes;

use crate::error::EntryError;
use crate::io::source::Source;

pub const METADATA_HEADER_SIZE: u64 = 256;

#[derive(Debug, Clone, Copy)]
pub struct MetadataHeader {
    pub xml_size: i32,
    pub attachment_size: i32,
    /// Offset of the first XML byte, immediately following the header.
    pub xml_offset: u64,
}

pub fn decode_metadata_header(
    source: &Source,
    offset: u64,
) -> Result<MetadataHeader, EntryError> {
    let raw = source
        .read_at(offset, 8)
        .map_err(|e| EntryError::Corrupt(e.to_string()))?;
    let xml_size = i32::from_le_bytes(raw[0..4].try_into().unwrap());
    let attachment_size = i32::from_le_bytes(raw[4..8].try_into().unwrap());
    if xml_size < 0 || attachment_size < 0 {
        return Err(EntryError::Corrupt(format!(
            "negative metadata size: xml={xml_size} attachment={attachment_size}"
        )));
    }
    Ok(MetadataHeader {
        xml_size,
        attachment_size,
        xml_offset: offset + METADATA_HEADER_SIZE,
    })
}

/// Materializes the XML body described by `header`. Not called during the
/// main `open` walk; only on explicit `load_metadata`.
pub fn read_xml(source: &Source, header: &MetadataHeader) -> Result<Bytes, EntryError> {
    source
        .read_at(header.xml_offset, header.xml_size as usize)
        .map_err(|e| EntryError::Corrupt(e.to_string()))
}
