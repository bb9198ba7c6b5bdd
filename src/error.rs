use thiserror::Error;

/// I/O errors that can occur when reading from a local file source.
#[derive(Debug, Error)]
pub enum IoError {
    /// The underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Os(#[from] std::io::Error),

    /// Fewer bytes were delivered than requested.
    #[error("short read: requested {requested} bytes, got {delivered}")]
    ShortRead { requested: u64, delivered: u64 },

    /// A bounded source's read would cross its declared `begin + size` window.
    #[error("read out of bounds: requested {requested} bytes at offset {offset}, bound is {bound}")]
    OutOfBounds {
        offset: u64,
        requested: u64,
        bound: u64,
    },
}

/// Errors raised while walking segment headers.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The stream does not begin with a `ZISRAWFILE` segment.
    #[error("not a ZISRAW container: expected ZISRAWFILE header")]
    NotZisraw,

    /// An unrecognized segment identifier was encountered before EOF.
    #[error("corrupt segment at offset {offset}: unrecognized identifier {id:?}")]
    UnknownIdentifier { offset: u64, id: [u8; 16] },

    /// `allocated_size` was zero, negative, or would run past the source bound.
    #[error("corrupt segment at offset {offset}: invalid allocated_size {allocated_size}")]
    InvalidAllocatedSize { offset: u64, allocated_size: i64 },

    /// The cursor made no progress walking segments.
    #[error("corrupt segment: cursor stalled at offset {offset}")]
    NoProgress { offset: u64 },
}

/// Errors raised while decoding a recognized segment body.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A directory or dimension entry violates a structural invariant.
    #[error("corrupt entry: {0}")]
    Corrupt(String),

    /// Two tiles within one level share the same (X-start, Y-start) key.
    #[error("duplicate tile at X-start/Y-start within level {level}")]
    DuplicateTile { level: usize },

    /// A recognized but unimplemented sub-format was encountered.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Top-level error returned by `open` and `decode_associated`.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Entry(#[from] EntryError),

    /// Context chain: stage name plus the underlying failure, composed as the
    /// parse unwinds (`open -> decode source 0 -> read directory entry 37 -> ...`).
    #[error("{stage}: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<ContainerError>,
    },
}

impl ContainerError {
    /// Wraps this error with an additional stage label, building the
    /// chained diagnostic text described by the error handling design.
    pub fn at_stage(self, stage: impl Into<String>) -> Self {
        ContainerError::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }
}

/// Errors raised by the read-only query API against an already-open container.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A query index was outside the number of available items.
    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    /// A query key had no referent (tile id, attachment id).
    #[error("not found: {0}")]
    NotFound(String),
}
