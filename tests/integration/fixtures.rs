//! Builds synthetic `.czi` byte streams for the integration tests: a
//! `ZISRAWFILE` header segment followed by a `ZISRAWDIRECTORY` segment and
//! one `ZISRAWSUBBLOCK` segment per tile.

use zisraw_reader::format::segment::{ID_DIRECTORY, ID_FILE, ID_SUBBLOCK};

const SEGMENT_HEADER_SIZE: usize = 32;
const FILE_HEADER_BODY_SIZE: usize = 80;
const DIRECTORY_HEADER_SIZE: usize = 128;
const DIRECTORY_ENTRY_FIXED_SIZE: usize = 24;
const SUBBLOCK_LOCAL_HEADER_SIZE: usize = 32;

/// One tile to be baked into a directory, with its pixel payload.
pub struct EntrySpec {
    pub start_x: i32,
    pub size_x: i32,
    pub stored_x: i32,
    pub start_y: i32,
    pub size_y: i32,
    pub stored_y: i32,
    /// Extra dimensions beyond X/Y: `(axis, start, size, stored_size)`.
    pub extra: Vec<(u8, i32, i32, i32)>,
    pub data: Vec<u8>,
}

impl EntrySpec {
    pub fn tile(start_x: i32, start_y: i32, data: Vec<u8>) -> Self {
        EntrySpec {
            start_x,
            size_x: 16,
            stored_x: 16,
            start_y,
            size_y: 16,
            stored_y: 16,
            extra: Vec::new(),
            data,
        }
    }

    pub fn downsampled(start_x: i32, size_x: i32, stored_x: i32, data: Vec<u8>) -> Self {
        EntrySpec {
            start_x,
            size_x,
            stored_x,
            start_y: 0,
            size_y: size_x,
            stored_y: stored_x,
            extra: Vec::new(),
            data,
        }
    }

    /// Marks this tile as belonging to a single scene `start`.
    pub fn with_scene(mut self, start: i32) -> Self {
        self.extra.push((b'S', start, 1, 1));
        self
    }

    /// Marks this tile as a single sub-block spanning `size` consecutive
    /// scenes starting at `start` (`S.size > 1` within one directory entry).
    pub fn with_scene_span(mut self, start: i32, size: i32) -> Self {
        self.extra.push((b'S', start, size, size));
        self
    }

    fn dims(&self) -> Vec<(u8, i32, i32, i32)> {
        let mut dims = vec![
            (b'X', self.start_x, self.size_x, self.stored_x),
            (b'Y', self.start_y, self.size_y, self.stored_y),
        ];
        dims.extend(self.extra.iter().copied());
        dims
    }
}

fn pad_to_alignment(buf: &mut Vec<u8>) {
    let remainder = buf.len() % 32;
    if remainder != 0 {
        buf.extend(std::iter::repeat(0u8).take(32 - remainder));
    }
}

fn segment_header(id: &[u8; 16], allocated_size: i64, used_size: i64) -> Vec<u8> {
    let mut out = Vec::with_capacity(SEGMENT_HEADER_SIZE);
    out.extend_from_slice(id);
    out.extend_from_slice(&allocated_size.to_le_bytes());
    out.extend_from_slice(&used_size.to_le_bytes());
    out
}

fn dim_bytes(axis: u8, start: i32, size: i32, stored_size: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(20);
    out.push(axis);
    out.extend_from_slice(&[0, 0, 0]);
    out.extend_from_slice(&start.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&0f32.to_le_bytes());
    out.extend_from_slice(&stored_size.to_le_bytes());
    out
}

fn directory_entry_bytes(spec: &EntrySpec, file_position: i64) -> Vec<u8> {
    let dims = spec.dims();
    let mut out = Vec::with_capacity(DIRECTORY_ENTRY_FIXED_SIZE + 8 + dims.len() * 20);
    out.extend_from_slice(&0u16.to_le_bytes()); // schema
    out.extend_from_slice(&0i32.to_le_bytes()); // pixel_type = gray-8
    out.extend_from_slice(&file_position.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes()); // file_part
    out.extend_from_slice(&0i32.to_le_bytes()); // compression = uncompressed
    out.push(0); // pyramid_type = none; subsampling is read off size/stored_size, not this field
    out.extend_from_slice(&[0u8; 5]); // reserved
    out.extend_from_slice(&(dims.len() as i32).to_le_bytes());
    for (axis, start, size, stored) in dims {
        out.extend_from_slice(&dim_bytes(axis, start, size, stored));
    }
    out
}

/// One `ZISRAWSUBBLOCK` segment: local header (sizes) plus the raw payload.
fn subblock_segment(data: &[u8]) -> Vec<u8> {
    let mut local_header = vec![0u8; SUBBLOCK_LOCAL_HEADER_SIZE];
    local_header[0..4].copy_from_slice(&0i32.to_le_bytes()); // directory_size
    local_header[4..8].copy_from_slice(&0i32.to_le_bytes()); // metadata_size
    local_header[8..12].copy_from_slice(&0i32.to_le_bytes()); // attachment_size
    local_header[12..16].copy_from_slice(&(data.len() as i32).to_le_bytes());

    let mut body = local_header;
    body.extend_from_slice(data);
    let used_size = body.len() as i64;

    let mut out = segment_header(ID_SUBBLOCK, used_size, used_size);
    out.extend_from_slice(&body);
    pad_to_alignment(&mut out);
    out
}

/// Assembles a full `.czi` byte stream: one `ZISRAWFILE` header followed by
/// one `ZISRAWDIRECTORY` segment (one entry per `entries[i]`) and one
/// `ZISRAWSUBBLOCK` segment per entry, holding that entry's payload.
pub fn build_container(entries: &[EntrySpec]) -> Vec<u8> {
    // File header segment, padded out to the next 32-byte boundary; the
    // directory segment begins there.
    let mut file_seg = segment_header(ID_FILE, FILE_HEADER_BODY_SIZE as i64, FILE_HEADER_BODY_SIZE as i64);
    let mut file_body = vec![0u8; FILE_HEADER_BODY_SIZE];
    file_body[0..4].copy_from_slice(&1i32.to_le_bytes()); // major
    file_seg.extend_from_slice(&file_body);
    pad_to_alignment(&mut file_seg);
    let directory_position = file_seg.len() as i64;
    file_seg[52..60].copy_from_slice(&directory_position.to_le_bytes());

    // Directory segment body: header (entry_count) + entries. Subblocks are
    // laid out right after the directory segment, so their offsets must be
    // known before the entries (which embed them as `file_position`) are
    // written; entry length depends only on its dimension count.
    let entries_total: usize = entries
        .iter()
        .map(|spec| DIRECTORY_ENTRY_FIXED_SIZE + 8 + spec.dims().len() * 20)
        .sum();
    let dir_body_len = DIRECTORY_HEADER_SIZE + entries_total;
    let dir_seg_len = SEGMENT_HEADER_SIZE + dir_body_len;
    let dir_seg_len_aligned = dir_seg_len + (32 - dir_seg_len % 32) % 32;

    let mut subblock_offset = directory_position as usize + dir_seg_len_aligned;
    let mut subblocks = Vec::new();
    let mut file_positions = Vec::with_capacity(entries.len());
    for spec in entries {
        file_positions.push(subblock_offset as i64);
        let seg = subblock_segment(&spec.data);
        subblock_offset += seg.len();
        subblocks.push(seg);
    }

    let mut dir_seg = segment_header(ID_DIRECTORY, dir_body_len as i64, dir_body_len as i64);
    let mut dir_body = vec![0u8; DIRECTORY_HEADER_SIZE];
    dir_body[0..4].copy_from_slice(&(entries.len() as i32).to_le_bytes());
    for (spec, file_position) in entries.iter().zip(&file_positions) {
        dir_body.extend_from_slice(&directory_entry_bytes(spec, *file_position));
    }
    dir_seg.extend_from_slice(&dir_body);
    pad_to_alignment(&mut dir_seg);

    let mut out = file_seg;
    out.extend_from_slice(&dir_seg);
    for seg in subblocks {
        out.extend_from_slice(&seg);
    }
    out
}

pub fn write_container(dir: &std::path::Path, name: &str, entries: &[EntrySpec]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_container(entries)).unwrap();
    path
}
