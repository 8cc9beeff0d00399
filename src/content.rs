//! Byte content owned by regular files.
//!
//! The namespace only needs to own content; reading and writing it belongs to
//! the file-I/O layer above. [`ContentStore`] is the contract that layer
//! implements, and [`MemoryContent`] is a plain heap-backed implementation.

use std::fmt;

use parking_lot::RwLock;

/// Byte storage for a regular file.
///
/// # Thread Safety
///
/// Methods take `&self`; implementations use interior mutability so the store
/// can be shared through `Arc` by the file and any open handles.
pub trait ContentStore: Send + Sync + fmt::Debug {
    /// Current size in bytes.
    fn size(&self) -> u64;

    /// Shrinks the content to `size` bytes. Returns `true` if anything was
    /// removed; growing is not done by truncation.
    fn truncate(&self, size: u64) -> bool;

    /// Reads into `buf` starting at `pos`, returning the number of bytes read
    /// (0 at or past the end).
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> usize;

    /// Writes `data` at `pos`, zero-filling any gap past the current end.
    /// Returns the number of bytes written; a store that cannot hold the
    /// result writes nothing and returns 0.
    fn write_at(&self, pos: u64, data: &[u8]) -> usize;
}

/// Heap-backed [`ContentStore`].
#[derive(Default)]
pub struct MemoryContent {
    bytes: RwLock<Vec<u8>>,
}

impl MemoryContent {
    /// Largest size the content may grow to. Writes ending beyond it are
    /// refused.
    pub const MAX_SIZE: u64 = 1 << 32;

    /// Creates empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates content holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: RwLock::new(bytes.to_vec()),
        }
    }

    /// Returns a copy of the whole content.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }
}

impl ContentStore for MemoryContent {
    fn size(&self) -> u64 {
        self.bytes.read().len() as u64
    }

    fn truncate(&self, size: u64) -> bool {
        let mut bytes = self.bytes.write();
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        if size < bytes.len() {
            bytes.truncate(size);
            true
        } else {
            false
        }
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> usize {
        let bytes = self.bytes.read();
        let Ok(start) = usize::try_from(pos) else {
            return 0;
        };
        if start >= bytes.len() {
            return 0;
        }
        let n = buf.len().min(bytes.len() - start);
        buf[..n].copy_from_slice(&bytes[start..start + n]);
        n
    }

    fn write_at(&self, pos: u64, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let Some(end) = pos
            .checked_add(data.len() as u64)
            .filter(|end| *end <= Self::MAX_SIZE)
            .and_then(|end| usize::try_from(end).ok())
        else {
            return 0;
        };
        let start = end - data.len();

        let mut bytes = self.bytes.write();
        let len = bytes.len();
        if end > len {
            if bytes.try_reserve(end - len).is_err() {
                return 0;
            }
            bytes.resize(end, 0);
        }
        bytes[start..end].copy_from_slice(data);
        data.len()
    }
}

impl fmt::Debug for MemoryContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryContent")
            .field("size", &self.size())
            .finish()
    }
}
