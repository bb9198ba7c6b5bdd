//! Segment-level navigation: locating the next 32-byte-aligned segment
//! header in a source and classifying it by identifier.

use tracing::trace;

use crate::error::SegmentError;
use crate::io::source::Source;

pub const SEGMENT_ALIGNMENT: u64 = 32;
pub const SEGMENT_HEADER_SIZE: u64 = 32;

pub const ID_FILE: &[u8; 16] = b"ZISRAWFILE\0\0\0\0\0\0";
pub const ID_DIRECTORY: &[u8; 16] = b"ZISRAWDIRECTORY\0";
pub const ID_SUBBLOCK: &[u8; 16] = b"ZISRAWSUBBLOCK\0\0";
pub const ID_METADATA: &[u8; 16] = b"ZISRAWMETADATA\0\0";
pub const ID_ATTACH: &[u8; 16] = b"ZISRAWATTACH\0\0\0\0";
pub const ID_ATTACH_DIR: &[u8; 16] = b"ZISRAWATTDIR\0\0\0\0";
pub const ID_DELETED: &[u8; 16] = b"DELETED\0\0\0\0\0\0\0\0\0";

/// A segment header plus the body offset where the caller's decoder should
/// continue reading.
#[derive(Debug, Clone, Copy)]
pub struct SegmentHeader {
    pub id: [u8; 16],
    pub allocated_size: i64,
    pub used_size: i64,
    /// Offset of the first byte of the segment header.
    pub header_offset: u64,
    /// Offset of the first byte of the segment body (`header_offset + 32`).
    pub body_offset: u64,
}

impl SegmentHeader {
    pub fn is(&self, id: &[u8; 16]) -> bool {
        &self.id == id
    }

    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id)
            .trim_end_matches('\0')
            .to_string()
    }
}

/// Walks segments within one [`Source`], restoring 32-byte alignment before
/// every header read.
pub struct SegmentCursor<'a> {
    source: &'a Source,
    pos: u64,
    bound: Option<u64>,
}

impl<'a> SegmentCursor<'a> {
    /// Creates a cursor starting at `start` within `source`, optionally
    /// bounded to `bound` absolute bytes (for an embedded attachment body).
    pub fn new(source: &'a Source, start: u64, bound: Option<u64>) -> Self {
        Self {
            source,
            pos: start,
            bound,
        }
    }

    fn at_end(&self) -> Result<bool, SegmentError> {
        let size = self.source.size()?;
        let limit = self.bound.unwrap_or(size).min(size);
        Ok(self.pos >= limit)
    }

    /// Reads the next segment header, realigning to the next 32-byte
    /// boundary first. Returns `Ok(None)` at end of stream.
    pub fn next_header(&mut self) -> Result<Option<SegmentHeader>, SegmentError> {
        let misalignment = self.pos % SEGMENT_ALIGNMENT;
        if misalignment != 0 {
            self.pos += SEGMENT_ALIGNMENT - misalignment;
        }

        if self.at_end()? {
            return Ok(None);
        }

        let header_offset = self.pos;
        let raw = self.source.read_at(header_offset, 32)?;
        let mut id = [0u8; 16];
        id.copy_from_slice(&raw[0..16]);
        let allocated_size = i64::from_le_bytes(raw[16..24].try_into().unwrap());
        let used_size = i64::from_le_bytes(raw[24..32].try_into().unwrap());

        let recognized = [
            *ID_FILE,
            *ID_DIRECTORY,
            *ID_SUBBLOCK,
            *ID_METADATA,
            *ID_ATTACH,
            *ID_ATTACH_DIR,
            *ID_DELETED,
        ];
        if !recognized.contains(&id) {
            return Err(SegmentError::UnknownIdentifier {
                offset: header_offset,
                id,
            });
        }

        if allocated_size <= 0 {
            return Err(SegmentError::InvalidAllocatedSize {
                offset: header_offset,
                allocated_size,
            });
        }
        let body_offset = header_offset + SEGMENT_HEADER_SIZE;
        let size = self.source.size()?;
        let limit = self.bound.unwrap_or(size).min(size);
        if body_offset + allocated_size as u64 > limit {
            return Err(SegmentError::InvalidAllocatedSize {
                offset: header_offset,
                allocated_size,
            });
        }

        trace!(
            offset = header_offset,
            id = %String::from_utf8_lossy(&id).trim_end_matches('\0'),
            allocated_size,
            "read segment header"
        );

        self.pos = body_offset;
        Ok(Some(SegmentHeader {
            id,
            allocated_size,
            used_size,
            header_offset,
            body_offset,
        }))
    }

    /// Advances the cursor past the current segment's body, assuming the
    /// cursor is positioned at `header.body_offset`.
    pub fn skip(&mut self, header: &SegmentHeader) {
        self.pos = header.body_offset + header.allocated_size as u64;
    }

    /// Repeatedly walks headers, skipping non-matching segments, until one
    /// with identifier `id` is found or the stream is exhausted.
    pub fn next_header_with_id(
        &mut self,
        id: &[u8; 16],
    ) -> Result<Option<SegmentHeader>, SegmentError> {
        let mut last_pos = u64::MAX;
        loop {
            let before = self.pos;
            let Some(header) = self.next_header()? else {
                return Ok(None);
            };
            if header.is(id) {
                return Ok(Some(header));
            }
            self.skip(&header);
            if self.pos == before && before == last_pos {
                return Err(SegmentError::NoProgress { offset: self.pos });
            }
            last_pos = before;
        }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }
}
