//! Persistent storage abstraction for rally point slots.
//!
//! The rally table never owns a concrete storage medium. It is handed a
//! `RallyStorage` that exposes byte-range reads and writes relative to the
//! start of a reserved region, so the same table logic runs against Flash on
//! the vehicle and against `MemoryStorage` on the host.

use core::fmt;

/// Errors reported by a storage medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Byte range lies outside the storage region
    OutOfBounds,
    /// Medium failed to read
    ReadFailed,
    /// Medium failed to write
    WriteFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OutOfBounds => write!(f, "storage range out of bounds"),
            StorageError::ReadFailed => write!(f, "storage read failed"),
            StorageError::WriteFailed => write!(f, "storage write failed"),
        }
    }
}

/// Byte-addressable persistent region
///
/// Offsets are relative to the start of the region. A `write` must be
/// persisted as a whole before it returns; there is no flush step.
pub trait RallyStorage {
    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `offset`
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), StorageError>;

    /// Size of the region in bytes
    fn size(&self) -> u32;
}

impl<T: RallyStorage + ?Sized> RallyStorage for &mut T {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(offset, buf)
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(offset, data)
    }

    fn size(&self) -> u32 {
        (**self).size()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// In-memory storage region of `N` bytes.
///
/// Starts zero-filled, like a freshly cleared EEPROM image.
///
/// # Example
///
/// ```
/// use pico_rally_core::traits::{MemoryStorage, RallyStorage};
///
/// let mut storage = MemoryStorage::<64>::new();
/// storage.write(4, &[1, 2, 3]).unwrap();
///
/// let mut buf = [0u8; 3];
/// storage.read(4, &mut buf).unwrap();
/// assert_eq!(buf, [1, 2, 3]);
/// assert_eq!(storage.write_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
    writes: u32,
}

impl<const N: usize> MemoryStorage<N> {
    /// Create a zero-filled region
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            writes: 0,
        }
    }

    /// Raw region contents
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }

    /// Overwrite bytes directly, bypassing the write counter
    ///
    /// Used by tests to simulate corrupted slots.
    pub fn corrupt(&mut self, offset: usize, pattern: &[u8]) {
        self.bytes[offset..offset + pattern.len()].copy_from_slice(pattern);
    }

    /// Number of `write` calls that reached the medium
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    fn range(offset: u32, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > N {
            return Err(StorageError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RallyStorage for MemoryStorage<N> {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn size(&self) -> u32 {
        N as u32
    }
}
