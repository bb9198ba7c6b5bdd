//! Source binding: a master `.czi` file plus its discovered sibling part files,
//! and embedded sub-streams carved out of an attachment blob.
//!
//! Files are opened lazily, on first read, and held behind a `RefCell` rather
//! than a `Mutex`: a `Container` is operated on by one thread at a time
//! (single-threaded cooperative model), so interior mutability without
//! synchronization is sufficient and matches the cost of the access pattern.

use std::cell::RefCell;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::error::IoError;
use crate::io::byte_reader::ByteReader;

/// One binding this container reads from: either a file on disk, or an
/// owned in-memory buffer bounded to an attachment's payload.
pub enum Source {
    File {
        path: PathBuf,
        handle: RefCell<Option<File>>,
    },
    Embedded {
        label: String,
        bytes: Bytes,
    },
}

impl Source {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Source::File {
            path: path.into(),
            handle: RefCell::new(None),
        }
    }

    pub fn from_embedded(label: impl Into<String>, bytes: Bytes) -> Self {
        Source::Embedded {
            label: label.into(),
            bytes,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Source::File { path, .. } => path.display().to_string(),
            Source::Embedded { label, .. } => label.clone(),
        }
    }

    /// Positioned read of `len` bytes at `offset`, honoring an embedded
    /// source's bound.
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        match self {
            Source::File { path, handle } => {
                let mut guard = handle.borrow_mut();
                if guard.is_none() {
                    debug!(path = %path.display(), "opening source file");
                    *guard = Some(File::open(path)?);
                }
                let file = guard.as_mut().unwrap();
                let mut reader = ByteReader::new(file, None);
                reader.seek_to(offset)?;
                reader.read_exact(len)
            }
            Source::Embedded { bytes, .. } => {
                let mut cursor = Cursor::new(bytes.as_ref());
                let mut reader = ByteReader::new(&mut cursor, Some(bytes.len() as u64));
                reader.seek_to(offset)?;
                reader.read_exact(len)
            }
        }
    }

    /// Total readable size of this source, if known.
    pub fn size(&self) -> Result<u64, IoError> {
        match self {
            Source::File { path, handle } => {
                let mut guard = handle.borrow_mut();
                if guard.is_none() {
                    *guard = Some(File::open(path)?);
                }
                Ok(guard.as_ref().unwrap().metadata()?.len())
            }
            Source::Embedded { bytes, .. } => Ok(bytes.len() as u64),
        }
    }
}

/// Discovers the sibling part files for `master_path`: `X.czi`,
/// `X (1).czi`, `X (2).czi`, ... stopping at the first missing index.
pub fn discover_sources(master_path: &Path) -> Result<Vec<Source>, IoError> {
    let mut sources = vec![Source::from_path(master_path)];

    let base = strip_czi_suffix(master_path);
    for i in 1.. {
        let sibling = sibling_path(&base, i);
        if sibling.exists() {
            debug!(sibling = %sibling.display(), "found sibling part file");
            sources.push(Source::from_path(sibling));
        } else {
            break;
        }
    }
    Ok(sources)
}

fn strip_czi_suffix(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.ends_with(".czi") => PathBuf::from(&s[..s.len() - 4]),
        _ => path.to_path_buf(),
    }
}

fn sibling_path(base: &Path, index: u32) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(format!(" ({index}).czi"));
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_czi_suffix() {
        assert_eq!(
            strip_czi_suffix(Path::new("/data/vol.czi")),
            PathBuf::from("/data/vol")
        );
    }

    #[test]
    fn builds_sibling_name() {
        assert_eq!(
            sibling_path(Path::new("/data/vol"), 1),
            PathBuf::from("/data/vol (1).czi")
        );
    }

    #[test]
    fn discovery_stops_at_first_missing_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let master = dir.path().join("vol.czi");
        std::fs::write(&master, b"master").unwrap();
        std::fs::write(dir.path().join("vol (1).czi"), b"part1").unwrap();
        // vol (2).czi intentionally absent

        let sources = discover_sources(&master).unwrap();
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn discovery_finds_only_master_when_no_siblings_exist() {
        let dir = tempfile::tempdir().unwrap();
        let master = dir.path().join("single.czi");
        std::fs::write(&master, b"master").unwrap();

        let sources = discover_sources(&master).unwrap();
        assert_eq!(sources.len(), 1);
    }
}
