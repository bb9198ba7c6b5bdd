//! # zisraw-reader
//!
//! A reader for the ZISRAW/CZI whole-slide microscopy container format.
//!
//! This library parses a `.czi` file (and its discovered sibling part
//! files) into an in-memory [`container::Container`]: a flat pyramid index
//! of tiles grouped into [`pyramid::Level`]s by subsampling factor, plus
//! lazily-materialized metadata XML and associated-image attachments. It
//! streams tile/metadata/attachment payloads directly from disk on demand
//! rather than decoding pixels or caching anything beyond what the caller
//! explicitly loads.
//!
//! ## Architecture
//!
//! - [`io`] - positioned byte reading and local-file/sibling-part source discovery
//! - [`mod@format`] - segment, header, directory, dimension, metadata, and attachment codecs
//! - [`pyramid`] - level/tile indexing from decoded directory entries
//! - [`container`] - the root handle a parse builds and the query API reads from
//! - [`diagnostics`] - human-readable dumps of an open container
//! - [`config`] - CLI types for the `zisraw-dump` diagnostic binary
//!
//! ## Example
//!
//! ```no_run
//! use zisraw_reader::container::{Container, OpenOptions};
//!
//! let container = Container::open(
//!     std::path::Path::new("slide.czi"),
//!     OpenOptions::default(),
//! ).expect("open container");
//!
//! println!("levels: {}", container.level_count());
//! ```

pub mod config;
pub mod container;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod io;
pub mod pyramid;

pub use container::{Container, OpenOptions, TileId};
pub use error::{ContainerError, EntryError, IoError, QueryError, SegmentError};
