//! Flash-backed rally point region
//!
//! The region is two erase blocks ("banks") used in turn. Each bank holds a
//! header and a complete image of the rally slot area:
//!
//! ```text
//! offset  size  field
//!      0     4  magic     "RALY"
//!      4     4  sequence  u32, incremented on every save
//!      8     4  crc       CRC-32 over magic, sequence and image
//!     12     -  image     slot bytes (logical offset 0)
//! ```
//!
//! A write copies the active image, patches it and programs it into the
//! other bank, header last. The active bank is never touched, and is only
//! erased by the following write once the new bank has been verified, so a
//! power loss at any point leaves at least one complete image.

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::platform::{error::FlashError, traits::FlashInterface, PlatformError, Result};
use crate::{log_debug, log_info};
use pico_rally_core::traits::{RallyStorage, StorageError};

/// Rally point region base address (see Flash memory layout)
pub const RALLY_FLASH_BASE: u32 = 0x046000;

/// Rally point region size (two 4 KB banks)
pub const RALLY_FLASH_SIZE: u32 = 0x2000;

/// Largest supported erase block
pub const MAX_BLOCK_SIZE: usize = 4096;

/// Bytes at the start of each bank reserved for the header
pub const BANK_HEADER_SIZE: usize = 12;

/// Bank header magic
const BANK_MAGIC: [u8; 4] = *b"RALY";

/// Number of banks in the region
const NUM_BANKS: u32 = 2;

/// Read size used when checksumming a bank in place
const VERIFY_CHUNK: usize = 64;

/// CRC32 algorithm (ISO HDLC), same as the parameter blocks
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Bank holding the current image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveBank {
    index: u32,
    sequence: u32,
}

/// True if `a` was saved after `b`, allowing for wrap-around
fn sequence_newer(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) > 0
}

/// Rally storage over a pair of Flash banks
///
/// Until the first save the region reads as erased (0xFF).
pub struct FlashRallyStorage<F: FlashInterface> {
    flash: F,
    base: u32,
    block_size: u32,
    active: Option<ActiveBank>,
}

impl<F: FlashInterface> FlashRallyStorage<F> {
    /// Use the default rally region
    pub fn new(flash: F) -> Result<Self> {
        Self::with_region(flash, RALLY_FLASH_BASE)
    }

    /// Use two consecutive erase blocks starting at `base`
    ///
    /// Scans both banks and continues from the newest valid one.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` if `base` is not block
    /// aligned, the banks extend past the Flash capacity, or the Flash block
    /// size is not in `BANK_HEADER_SIZE + 1..=MAX_BLOCK_SIZE`.
    pub fn with_region(flash: F, base: u32) -> Result<Self> {
        let block_size = flash.block_size();
        let end = block_size
            .checked_mul(NUM_BANKS)
            .and_then(|size| base.checked_add(size));

        let valid = block_size as usize > BANK_HEADER_SIZE
            && block_size as usize <= MAX_BLOCK_SIZE
            && base.is_multiple_of(block_size)
            && end.is_some_and(|end| end <= flash.capacity());

        if !valid {
            return Err(PlatformError::InvalidConfig);
        }

        let mut storage = Self {
            flash,
            base,
            block_size,
            active: None,
        };
        storage.active = storage.find_active_bank();

        match storage.active {
            Some(bank) => log_debug!(
                "Rally: Flash bank {} active, sequence {}",
                bank.index,
                bank.sequence
            ),
            None => log_info!("Rally: no valid Flash bank, region reads erased"),
        }

        Ok(storage)
    }

    /// Underlying Flash
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Release the underlying Flash
    pub fn into_inner(self) -> F {
        self.flash
    }

    /// Index of the bank holding the current image, if any save succeeded
    pub fn active_bank(&self) -> Option<u32> {
        self.active.map(|bank| bank.index)
    }

    fn bank_address(&self, index: u32) -> u32 {
        self.base + index * self.block_size
    }

    fn image_len(&self) -> usize {
        self.block_size as usize - BANK_HEADER_SIZE
    }

    /// Check that `len` bytes at `offset` lie inside the image
    fn check_range(&self, offset: u32, len: usize) -> core::result::Result<usize, StorageError> {
        let start = offset as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.image_len() => Ok(start),
            _ => Err(StorageError::OutOfBounds),
        }
    }

    /// Sequence number of bank `index` if it holds a complete image
    fn bank_sequence(&mut self, index: u32) -> Result<Option<u32>> {
        let address = self.bank_address(index);

        let mut header = [0u8; BANK_HEADER_SIZE];
        self.flash.read(address, &mut header)?;
        if header[..4] != BANK_MAGIC {
            return Ok(None);
        }

        let sequence = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let stored_crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        let mut digest = CRC32.digest();
        digest.update(&header[..8]);

        let mut chunk = [0u8; VERIFY_CHUNK];
        let mut offset = BANK_HEADER_SIZE as u32;
        while offset < self.block_size {
            let len = VERIFY_CHUNK.min((self.block_size - offset) as usize);
            self.flash.read(address + offset, &mut chunk[..len])?;
            digest.update(&chunk[..len]);
            offset += len as u32;
        }

        Ok((digest.finalize() == stored_crc).then_some(sequence))
    }

    /// Find the bank with the newest valid image
    ///
    /// A bank that fails to read or whose CRC does not match is ignored, so
    /// an interrupted save falls back to the previous image.
    fn find_active_bank(&mut self) -> Option<ActiveBank> {
        let mut active: Option<ActiveBank> = None;

        for index in 0..NUM_BANKS {
            let Ok(Some(sequence)) = self.bank_sequence(index) else {
                continue;
            };

            if active.is_none_or(|bank| sequence_newer(sequence, bank.sequence)) {
                active = Some(ActiveBank { index, sequence });
            }
        }

        active
    }

    /// Program `image` into the inactive bank and switch to it
    fn save_image(&mut self, image: &[u8]) -> Result<()> {
        let next = match self.active {
            Some(bank) => ActiveBank {
                index: (bank.index + 1) % NUM_BANKS,
                sequence: bank.sequence.wrapping_add(1),
            },
            None => ActiveBank {
                index: 0,
                sequence: 1,
            },
        };
        let address = self.bank_address(next.index);

        let mut header = [0u8; BANK_HEADER_SIZE];
        header[..4].copy_from_slice(&BANK_MAGIC);
        header[4..8].copy_from_slice(&next.sequence.to_le_bytes());

        let mut digest = CRC32.digest();
        digest.update(&header[..8]);
        digest.update(image);
        header[8..].copy_from_slice(&digest.finalize().to_le_bytes());

        self.flash.erase(address, self.block_size)?;
        self.flash.write(address + BANK_HEADER_SIZE as u32, image)?;
        self.flash.write(address, &header)?;

        // Only switch once the new bank reads back intact
        if self.bank_sequence(next.index)? != Some(next.sequence) {
            return Err(FlashError::WriteFailed.into());
        }

        log_debug!(
            "Rally: saved Flash bank {}, sequence {}",
            next.index,
            next.sequence
        );
        self.active = Some(next);
        Ok(())
    }
}

impl<F: FlashInterface> RallyStorage for FlashRallyStorage<F> {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> core::result::Result<(), StorageError> {
        self.check_range(offset, buf.len())?;

        match self.active {
            Some(bank) => {
                let address = self.bank_address(bank.index) + BANK_HEADER_SIZE as u32 + offset;
                self.flash
                    .read(address, buf)
                    .map_err(|e| e.to_storage_error(StorageError::ReadFailed))
            }
            None => {
                buf.fill(0xFF);
                Ok(())
            }
        }
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> core::result::Result<(), StorageError> {
        let start = self.check_range(offset, data.len())?;

        let mut buf = [0xFFu8; MAX_BLOCK_SIZE];
        let image = &mut buf[..self.image_len()];
        if let Some(bank) = self.active {
            let address = self.bank_address(bank.index) + BANK_HEADER_SIZE as u32;
            self.flash
                .read(address, image)
                .map_err(|e| e.to_storage_error(StorageError::ReadFailed))?;
        }

        let target = &mut image[start..start + data.len()];
        if target == data {
            return Ok(());
        }
        target.copy_from_slice(data);

        self.save_image(image)
            .map_err(|e| e.to_storage_error(StorageError::WriteFailed))
    }

    fn size(&self) -> u32 {
        self.image_len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    const BANK_0: u32 = RALLY_FLASH_BASE;
    const BANK_1: u32 = RALLY_FLASH_BASE + 0x1000;

    fn storage() -> FlashRallyStorage<MockFlash> {
        FlashRallyStorage::new(MockFlash::new()).unwrap()
    }

    fn read_back(storage: &mut FlashRallyStorage<MockFlash>, offset: u32) -> [u8; 15] {
        let mut buf = [0u8; 15];
        storage.read(offset, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_default_region() {
        let storage = storage();
        assert_eq!(storage.size(), 4096 - BANK_HEADER_SIZE as u32);
        assert_eq!(storage.active_bank(), None);
    }

    #[test]
    fn test_invalid_regions_rejected() {
        // Unaligned base
        assert!(matches!(
            FlashRallyStorage::with_region(MockFlash::new(), 0x046100),
            Err(PlatformError::InvalidConfig)
        ));
        // Second bank past capacity
        assert!(matches!(
            FlashRallyStorage::with_region(MockFlash::new(), 0x0FF000),
            Err(PlatformError::InvalidConfig)
        ));
        assert!(matches!(
            FlashRallyStorage::with_region(MockFlash::new(), u32::MAX - 0xFFF),
            Err(PlatformError::InvalidConfig)
        ));
    }

    #[test]
    fn test_erased_region_reads_ff() {
        let mut storage = storage();
        assert_eq!(read_back(&mut storage, 0), [0xFF; 15]);
    }

    #[test]
    fn test_writes_alternate_banks() {
        let mut storage = storage();

        storage.write(0, &[0x11; 15]).unwrap();
        assert_eq!(storage.active_bank(), Some(0));
        storage.write(15, &[0x22; 15]).unwrap();
        assert_eq!(storage.active_bank(), Some(1));
        storage.write(0, &[0xEE; 15]).unwrap();
        assert_eq!(storage.active_bank(), Some(0));

        assert_eq!(storage.flash().erase_count(BANK_0), 2);
        assert_eq!(storage.flash().erase_count(BANK_1), 1);

        assert_eq!(read_back(&mut storage, 0), [0xEE; 15]);
        assert_eq!(read_back(&mut storage, 15), [0x22; 15]);
        assert_eq!(read_back(&mut storage, 30), [0xFF; 15]);
    }

    #[test]
    fn test_header_layout() {
        let mut storage = storage();
        storage.write(0, &[0x42; 15]).unwrap();

        let flash = storage.flash();
        assert_eq!(flash.contents(BANK_0, 4), b"RALY");
        assert_eq!(flash.contents(BANK_0 + 4, 4), &1u32.to_le_bytes());
        assert_eq!(flash.contents(BANK_0 + BANK_HEADER_SIZE as u32, 15), &[0x42; 15]);
    }

    #[test]
    fn test_unchanged_write_skipped() {
        let mut storage = storage();
        storage.write(0, &[0x42; 15]).unwrap();
        let writes = storage.flash().write_count();

        storage.write(0, &[0x42; 15]).unwrap();
        assert_eq!(storage.flash().write_count(), writes);
        assert_eq!(storage.flash().total_erase_count(), 1);
    }

    #[test]
    fn test_reopen_uses_newest_bank() {
        let mut storage = storage();
        storage.write(0, &[0x11; 15]).unwrap();
        storage.write(0, &[0x22; 15]).unwrap();
        storage.write(0, &[0x33; 15]).unwrap();

        let mut storage = FlashRallyStorage::new(storage.into_inner()).unwrap();
        assert_eq!(storage.active_bank(), Some(0));
        assert_eq!(read_back(&mut storage, 0), [0x33; 15]);
    }

    #[test]
    fn test_power_loss_keeps_previous_image() {
        let mut storage = storage();
        storage.write(0, &[0x11; 15]).unwrap();
        storage.write(15, &[0x22; 15]).unwrap();

        // Image program is cut short; the new bank never verifies
        let mut flash = storage.into_inner();
        flash.simulate_power_loss();
        let mut storage = FlashRallyStorage::new(flash).unwrap();
        assert_eq!(storage.write(0, &[0x00; 15]), Err(StorageError::WriteFailed));
        assert_eq!(storage.active_bank(), Some(1));
        assert_eq!(read_back(&mut storage, 0), [0x11; 15]);

        // Same after a reboot
        let mut storage = FlashRallyStorage::new(storage.into_inner()).unwrap();
        assert_eq!(storage.active_bank(), Some(1));
        assert_eq!(read_back(&mut storage, 0), [0x11; 15]);
        assert_eq!(read_back(&mut storage, 15), [0x22; 15]);

        // And the next save goes through
        storage.write(0, &[0x00; 15]).unwrap();
        assert_eq!(read_back(&mut storage, 0), [0x00; 15]);
        assert_eq!(read_back(&mut storage, 15), [0x22; 15]);
    }

    #[test]
    fn test_corrupted_newest_bank_falls_back() {
        let mut storage = storage();
        storage.write(0, &[0x11; 15]).unwrap();
        storage.write(0, &[0x22; 15]).unwrap();

        // Flip bits in the image of bank 1 (sequence 2)
        let mut flash = storage.into_inner();
        flash.write(BANK_1 + BANK_HEADER_SIZE as u32 + 100, &[0x00]).unwrap();

        let mut storage = FlashRallyStorage::new(flash).unwrap();
        assert_eq!(storage.active_bank(), Some(0));
        assert_eq!(read_back(&mut storage, 0), [0x11; 15]);
    }

    #[test]
    fn test_sequence_wrap() {
        assert!(sequence_newer(2, 1));
        assert!(!sequence_newer(1, 2));
        assert!(!sequence_newer(5, 5));
        assert!(sequence_newer(0, u32::MAX));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut storage = storage();
        let size = storage.size();
        let mut buf = [0u8; 15];
        assert_eq!(storage.read(size - 10, &mut buf), Err(StorageError::OutOfBounds));
        assert_eq!(storage.write(size, &[0u8; 1]), Err(StorageError::OutOfBounds));
        assert_eq!(storage.write(u32::MAX, &[0u8; 2]), Err(StorageError::OutOfBounds));
        assert_eq!(storage.flash().write_count(), 0);
    }
}
