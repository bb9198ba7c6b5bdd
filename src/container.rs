//! The in-memory container graph: the root handle a parse builds and the
//! query API reads from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{ContainerError, EntryError, QueryError, SegmentError};
use crate::format::attachment::{
    decode_attachment_directory_header, decode_attachment_entry, read_attachment_payload,
    AttachmentEntry,
};
use crate::format::dimension::DimensionPolicy;
use crate::format::directory::{decode_directory_entry, decode_directory_header};
use crate::format::enums::{CompressionKind, PixelType, PyramidKind};
use crate::format::file_header::{decode_file_header, FileHeader};
use crate::format::metadata::{decode_metadata_header, read_xml, MetadataHeader};
use crate::format::segment::{
    SegmentCursor, ID_ATTACH, ID_ATTACH_DIR, ID_DIRECTORY, ID_FILE, ID_SUBBLOCK,
};
use crate::format::subblock::decode_subblock_local_header;
use crate::io::source::{discover_sources, Source};
use crate::pyramid::{insert_tile, Level};

/// Capability flags derived from the full set of indexed tiles: whether any
/// tile carries more than one coordinate along the mapped axis, and which
/// compression kinds are present anywhere in the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub multi_view: bool,
    pub multi_phase: bool,
    pub multi_block: bool,
    pub multi_illumination: bool,
    pub multi_scene: bool,
    pub multi_rotation: bool,
    pub multi_time: bool,
    pub multi_zslice: bool,
    pub multi_channel: bool,
    pub has_uncompressed: bool,
    pub has_jpeg: bool,
    pub has_jpeg_xr: bool,
    pub has_lzw: bool,
    pub has_camera_spec: bool,
    pub has_system_spec: bool,
}

impl Capabilities {
    fn derive(levels: &[Level]) -> Self {
        let mut caps = Capabilities::default();
        for level in levels {
            caps.multi_view |= level.is_multi('V');
            caps.multi_phase |= level.is_multi('H');
            caps.multi_block |= level.is_multi('B');
            caps.multi_illumination |= level.is_multi('I');
            caps.multi_scene |= level.is_multi('S');
            caps.multi_rotation |= level.is_multi('R');
            caps.multi_time |= level.is_multi('T');
            caps.multi_zslice |= level.is_multi('Z');
            caps.multi_channel |= level.is_multi('C');
            for tile in level.tiles.values() {
                match tile.compression {
                    CompressionKind::Uncompressed => caps.has_uncompressed = true,
                    CompressionKind::Jpeg => caps.has_jpeg = true,
                    CompressionKind::JpegXr => caps.has_jpeg_xr = true,
                    CompressionKind::Lzw => caps.has_lzw = true,
                    CompressionKind::CameraSpec => caps.has_camera_spec = true,
                    CompressionKind::SystemSpec => caps.has_system_spec = true,
                    CompressionKind::Unknown(_) => {}
                }
            }
        }
        caps
    }
}

pub struct MetadataRecord {
    pub source_index: usize,
    pub header: MetadataHeader,
    cached: RefCell<Option<Bytes>>,
}

pub struct AttachmentRecord {
    pub source_index: usize,
    pub entry: AttachmentEntry,
    pub segment_offset: u64,
    pub used_size: i64,
    cached: RefCell<Option<Bytes>>,
}

/// Associated-image kinds exposed via `decode_associated`, matched against
/// an [`AttachmentEntry::content_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociatedImageKind {
    Label,
    Prescan,
    SlidePreview,
}

impl AssociatedImageKind {
    fn content_type_tag(self) -> &'static str {
        match self {
            AssociatedImageKind::Label => "Label",
            AssociatedImageKind::Prescan => "Prescan",
            AssociatedImageKind::SlidePreview => "SlidePreview",
        }
    }
}

/// Parse-time options. `lenient` resolves the "unknown dimension
/// identifiers" open question by downgrading what is otherwise a fatal
/// `corrupt_entry` to a dropped-dimension warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    pub lenient: bool,
}

/// Root handle: owns every `Source`, `FileHeader`, `Level` (and therefore
/// every `Tile`), `MetadataRecord`, and `AttachmentRecord`. Back-references
/// downward from this struct are plain indices, never pointers, so freeing
/// the container (dropping it) releases everything in one pass.
pub struct Container {
    sources: Vec<Source>,
    file_headers: Vec<FileHeader>,
    levels: Vec<Level>,
    metadata: Vec<MetadataRecord>,
    attachments: HashMap<Uuid, AttachmentRecord>,
    attachment_directory_loaded: bool,
    capabilities: Capabilities,
}

/// A tile identifier as seen by the query layer: the 8-byte (X-start,
/// Y-start) composite is only unique within its level (testable property
/// 2), so the public id pairs it with the owning level's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub level: usize,
    pub key: [u8; 8],
}

/// Summary of one tile, as returned by `level_tiles`.
#[derive(Debug, Clone, Copy)]
pub struct TileDescriptor {
    pub id: TileId,
    pub pixel_type: PixelType,
    pub compression: CompressionKind,
    pub pyramid_kind: PyramidKind,
    pub ss_x: i32,
    pub ss_y: i32,
    pub start_x: i32,
    pub start_y: i32,
    pub size_x: i32,
    pub size_y: i32,
}

impl Container {
    /// Quick, cheap probe for whether `path` begins with a `ZISRAWFILE`
    /// segment, without building a full `Container`.
    pub fn is_zisraw(path: &Path) -> Result<bool, ContainerError> {
        let source = Source::from_path(path);
        let mut cursor = SegmentCursor::new(&source, 0, None);
        match cursor.next_header() {
            Ok(Some(header)) => Ok(header.is(ID_FILE)),
            Ok(None) => Ok(false),
            Err(e) => Err(ContainerError::from(e)),
        }
    }

    #[instrument(skip(opts), fields(path = %path.display()))]
    pub fn open(path: &Path, opts: OpenOptions) -> Result<Container, ContainerError> {
        let sources =
            discover_sources(path).map_err(|e| ContainerError::from(e).at_stage("open"))?;
        Self::open_sources(sources, opts)
    }

    /// Builds a `Container` from an already-bound set of sources, skipping
    /// sibling-file discovery. Shared by `open` (a master file plus its
    /// discovered part files) and `decode_associated` (a single `Embedded`
    /// source carved out of an attachment's payload).
    fn open_sources(sources: Vec<Source>, opts: OpenOptions) -> Result<Container, ContainerError> {
        let mut file_headers = Vec::with_capacity(sources.len());
        let mut levels: Vec<Level> = Vec::new();
        let mut metadata = Vec::new();

        for (source_index, source) in sources.iter().enumerate() {
            let stage = format!("decode source {source_index}");
            let header = Self::read_file_header(source)
                .map_err(|e| ContainerError::from(e).at_stage(stage.clone()))?;

            if header.directory_position != 0 {
                Self::walk_directory(
                    source,
                    source_index,
                    header.directory_position as u64,
                    &mut levels,
                    opts,
                )
                .map_err(|e| ContainerError::from(e).at_stage(format!("{stage}: directory")))?;
            }

            if header.metadata_position != 0 {
                if let Some(record) = Self::read_metadata_header(
                    source,
                    source_index,
                    header.metadata_position as u64,
                )
                .map_err(|e| ContainerError::from(e).at_stage(format!("{stage}: metadata")))?
                {
                    metadata.push(record);
                }
            }

            file_headers.push(header);
        }

        let capabilities = Capabilities::derive(&levels);

        info!(
            sources = sources.len(),
            levels = levels.len(),
            metadata = metadata.len(),
            "opened container"
        );

        Ok(Container {
            sources,
            file_headers,
            levels,
            metadata,
            attachments: HashMap::new(),
            attachment_directory_loaded: false,
            capabilities,
        })
    }

    fn read_file_header(source: &Source) -> Result<FileHeader, EntryError> {
        let mut cursor = SegmentCursor::new(source, 0, None);
        let header = cursor
            .next_header()
            .map_err(|e| EntryError::Corrupt(e.to_string()))?
            .ok_or_else(|| EntryError::Corrupt("empty source".into()))?;
        if !header.is(ID_FILE) {
            return Err(EntryError::Corrupt(
                SegmentError::NotZisraw.to_string(),
            ));
        }
        decode_file_header(source, header.body_offset)
    }

    fn walk_directory(
        source: &Source,
        source_index: usize,
        position: u64,
        levels: &mut Vec<Level>,
        opts: OpenOptions,
    ) -> Result<(), EntryError> {
        let mut cursor = SegmentCursor::new(source, position, None);
        let header = cursor
            .next_header()
            .map_err(|e| EntryError::Corrupt(e.to_string()))?
            .ok_or_else(|| EntryError::Corrupt("missing directory segment".into()))?;
        if !header.is(ID_DIRECTORY) {
            return Err(EntryError::Corrupt(format!(
                "expected ZISRAWDIRECTORY at {position}, found {}",
                header.id_str()
            )));
        }

        let (entry_count, mut cursor_offset) = decode_directory_header(source, header.body_offset)?;
        if entry_count < 0 {
            return Err(EntryError::Corrupt(format!(
                "negative directory entry_count {entry_count}"
            )));
        }

        let policy = DimensionPolicy {
            lenient: opts.lenient,
        };

        for i in 0..entry_count {
            let (entry, next_offset) = decode_directory_entry(source, cursor_offset, policy)
                .map_err(|e| {
                    EntryError::Corrupt(format!("directory entry {i}: {e}"))
                })?;
            cursor_offset = next_offset;

            let segment_offset = entry.file_position as u64;
            let local = decode_subblock_local_header(source, segment_offset)?;

            insert_tile(
                levels,
                entry,
                source_index,
                0,
                segment_offset,
                local.directory_size,
                local.metadata_size,
                local.data_size,
                local.attachment_size,
            )?;
        }

        Ok(())
    }

    fn read_metadata_header(
        source: &Source,
        source_index: usize,
        position: u64,
    ) -> Result<Option<MetadataRecord>, EntryError> {
        let mut cursor = SegmentCursor::new(source, position, None);
        let Some(header) = cursor
            .next_header()
            .map_err(|e| EntryError::Corrupt(e.to_string()))?
        else {
            return Ok(None);
        };
        let meta_header = decode_metadata_header(source, header.body_offset)?;
        Ok(Some(MetadataRecord {
            source_index,
            header: meta_header,
            cached: RefCell::new(None),
        }))
    }

    /// Walks `ZISRAWATTDIR`/`ZISRAWATTACH` segments, populating the
    /// attachment map. Called lazily by `decode_associated`; not part of the
    /// main `open` walk (design note (b)).
    fn ensure_attachment_directory_loaded(&mut self) -> Result<(), ContainerError> {
        if self.attachment_directory_loaded {
            return Ok(());
        }
        self.attachment_directory_loaded = true;

        for (source_index, (source, header)) in self
            .sources
            .iter()
            .zip(self.file_headers.iter())
            .enumerate()
        {
            if header.attachment_directory_position == 0 {
                continue;
            }
            let position = header.attachment_directory_position as u64;
            let mut cursor = SegmentCursor::new(source, position, None);
            let Some(dir_header) = cursor
                .next_header()
                .map_err(|e| ContainerError::from(EntryError::Corrupt(e.to_string())))?
            else {
                continue;
            };
            if !dir_header.is(ID_ATTACH_DIR) {
                warn!(source_index, "attachment_directory_position did not point at ZISRAWATTDIR");
                continue;
            }

            let (entry_count, mut cursor_offset) =
                decode_attachment_directory_header(source, dir_header.body_offset)
                    .map_err(ContainerError::from)?;

            for _ in 0..entry_count.max(0) {
                let entry = decode_attachment_entry(source, cursor_offset)
                    .map_err(ContainerError::from)?;
                cursor_offset += crate::format::attachment::ATTACHMENT_ENTRY_SIZE;

                let segment_position = entry.file_position as u64;
                let mut seg_cursor = SegmentCursor::new(source, segment_position, None);
                let Some(seg_header) = seg_cursor
                    .next_header()
                    .map_err(|e| ContainerError::from(EntryError::Corrupt(e.to_string())))?
                else {
                    continue;
                };
                if !seg_header.is(ID_ATTACH) {
                    continue;
                }

                let guid = entry.content_guid;
                self.attachments.insert(
                    guid,
                    AttachmentRecord {
                        source_index,
                        entry,
                        segment_offset: seg_header.header_offset,
                        used_size: seg_header.used_size,
                        cached: RefCell::new(None),
                    },
                );
            }
        }

        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn file_header(&self, source_index: usize) -> Option<&FileHeader> {
        self.file_headers.get(source_index)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Tile descriptors for every tile in `level_index`, in arbitrary order.
    pub fn level_tiles(&self, level_index: usize) -> Result<Vec<TileDescriptor>, QueryError> {
        let level = self.level(level_index).ok_or(QueryError::OutOfRange {
            index: level_index,
            len: self.levels.len(),
        })?;
        Ok(level
            .tiles
            .values()
            .map(|tile| TileDescriptor {
                id: TileId {
                    level: level_index,
                    key: tile.key,
                },
                pixel_type: tile.pixel_type,
                compression: tile.compression,
                pyramid_kind: tile.pyramid_kind,
                ss_x: level.ss_x,
                ss_y: level.ss_y,
                start_x: tile.dimensions.get(&'X').map(|d| d.start).unwrap_or(0),
                start_y: tile.dimensions.get(&'Y').map(|d| d.start).unwrap_or(0),
                size_x: tile.dimensions.get(&'X').map(|d| d.size).unwrap_or(0),
                size_y: tile.dimensions.get(&'Y').map(|d| d.size).unwrap_or(0),
            })
            .collect())
    }

    pub fn metadata_count(&self) -> usize {
        self.metadata.len()
    }

    pub fn load_metadata(&self, index: usize) -> Result<Bytes, QueryError> {
        let record = self.metadata.get(index).ok_or(QueryError::OutOfRange {
            index,
            len: self.metadata.len(),
        })?;
        if let Some(cached) = record.cached.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let source = &self.sources[record.source_index];
        let bytes = read_xml(source, &record.header)
            .map_err(|e| QueryError::NotFound(e.to_string()))?;
        *record.cached.borrow_mut() = Some(bytes.clone());
        Ok(bytes)
    }

    pub fn release_metadata(&self, index: usize) {
        if let Some(record) = self.metadata.get(index) {
            *record.cached.borrow_mut() = None;
        }
    }

    pub fn load_tile(&self, id: TileId) -> Result<Bytes, QueryError> {
        let level = self.levels.get(id.level).ok_or(QueryError::OutOfRange {
            index: id.level,
            len: self.levels.len(),
        })?;
        let tile = level
            .tiles
            .get(&id.key)
            .ok_or_else(|| QueryError::NotFound(format!("tile {:?} in level {}", id.key, id.level)))?;
        if let Some(cached) = tile.cached_data.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let source = &self.sources[tile.source_index];
        let data_offset = tile.segment_offset
            + crate::format::segment::SEGMENT_HEADER_SIZE
            + crate::format::subblock::SUBBLOCK_LOCAL_HEADER_SIZE
            + tile.directory_size as u64
            + tile.metadata_size as u64;
        let bytes = source
            .read_at(data_offset, tile.data_size as usize)
            .map_err(QueryError::from)?;
        *tile.cached_data.borrow_mut() = Some(bytes.clone());
        Ok(bytes)
    }

    pub fn release_tile(&self, id: TileId) {
        if let Some(level) = self.levels.get(id.level) {
            if let Some(tile) = level.tiles.get(&id.key) {
                *tile.cached_data.borrow_mut() = None;
            }
        }
    }

    /// Decodes the attachment matching `kind`, if present, as a nested
    /// `Container` opened over its embedded payload. The attachment's raw
    /// bytes are cached on first read so repeated calls don't re-hit disk,
    /// but the returned `Container` is parsed fresh each time since it
    /// can't be cheaply cloned.
    pub fn decode_associated(
        &mut self,
        kind: AssociatedImageKind,
    ) -> Result<Option<Container>, ContainerError> {
        self.ensure_attachment_directory_loaded()?;
        let record = self
            .attachments
            .values()
            .find(|r| r.entry.content_type == kind.content_type_tag());
        let Some(record) = record else {
            return Ok(None);
        };
        let bytes = if let Some(cached) = record.cached.borrow().as_ref() {
            cached.clone()
        } else {
            let source = &self.sources[record.source_index];
            let bytes = read_attachment_payload(source, record.segment_offset, record.used_size)
                .map_err(ContainerError::from)?;
            *record.cached.borrow_mut() = Some(bytes.clone());
            bytes
        };

        let label = format!(
            "{}: {} attachment",
            self.sources[record.source_index].label(),
            kind.content_type_tag()
        );
        let embedded = Source::from_embedded(label, bytes);
        let nested = Self::open_sources(vec![embedded], OpenOptions::default())
            .map_err(|e| e.at_stage(format!("decode_associated: {}", kind.content_type_tag())))?;
        Ok(Some(nested))
    }
}
