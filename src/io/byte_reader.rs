use bytes::Bytes;
use std::io::{Read, Seek, SeekFrom};

use crate::error::IoError;

/// Positioned, buffered reads over one [`Source`](super::source::Source).
///
/// ZISRAW fields are always little-endian, regardless of host architecture,
/// so unlike a bi-endian container format there is no per-file byte-order
/// flag to carry here: every multi-byte read goes through the standard
/// library's portable `from_le_bytes` constructors.
pub struct ByteReader<'a, R> {
    inner: &'a mut R,
    bound: Option<u64>,
}

impl<'a, R: Read + Seek> ByteReader<'a, R> {
    /// Wraps `inner`. `bound`, if set, is the number of bytes readable from
    /// the stream's current start position (an embedded sub-stream's `size`).
    pub fn new(inner: &'a mut R, bound: Option<u64>) -> Self {
        Self { inner, bound }
    }

    pub fn position(&mut self) -> Result<u64, IoError> {
        Ok(self.inner.stream_position()?)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<(), IoError> {
        self.check_bound(offset, 0)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn eof(&mut self) -> Result<bool, IoError> {
        let pos = self.position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(pos >= len || self.bound.is_some_and(|b| pos >= b))
    }

    fn check_bound(&self, offset: u64, len: u64) -> Result<(), IoError> {
        if let Some(bound) = self.bound {
            if offset + len > bound {
                return Err(IoError::OutOfBounds {
                    offset,
                    requested: len,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Reads exactly `len` bytes at the current position. On a short read,
    /// the error carries how many bytes actually came back before EOF.
    pub fn read_exact(&mut self, len: usize) -> Result<Bytes, IoError> {
        let pos = self.position()?;
        self.check_bound(pos, len as u64)?;
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(IoError::Os(e)),
            }
        }
        if filled < len {
            return Err(IoError::ShortRead {
                requested: len as u64,
                delivered: filled as u64,
            });
        }
        Ok(Bytes::from(buf))
    }

    pub fn read_u8(&mut self) -> Result<u8, IoError> {
        Ok(self.read_exact(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32, IoError> {
        let b = self.read_exact(4)?;
        Ok(i32::from_le_bytes(b[..4].try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32, IoError> {
        let b = self.read_exact(4)?;
        Ok(u32::from_le_bytes(b[..4].try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64, IoError> {
        let b = self.read_exact(8)?;
        Ok(i64::from_le_bytes(b[..8].try_into().unwrap()))
    }

    pub fn read_f32(&mut self) -> Result<f32, IoError> {
        let b = self.read_exact(4)?;
        Ok(f32::from_le_bytes(b[..4].try_into().unwrap()))
    }

    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], IoError> {
        let b = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&b);
        Ok(out)
    }

    pub fn skip(&mut self, len: u64) -> Result<(), IoError> {
        let pos = self.position()?;
        self.seek_to(pos + len)
    }
}
