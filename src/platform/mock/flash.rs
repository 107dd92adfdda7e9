//! Mock Flash implementation for testing
//!
//! In-memory NOR Flash simulation: erased bytes read 0xFF, writes can only
//! clear bits, erases work on whole blocks.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use std::vec::Vec;

/// Flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Flash capacity (1 MB)
const FLASH_CAPACITY: u32 = 1024 * 1024;

/// Protected firmware region (first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// Mock Flash implementation
///
/// Supports:
/// - Read/write/erase with NOR semantics
/// - Erase and write counters for wear checks
/// - Power-loss simulation (next write only half completes)
///
/// # Example
///
/// ```
/// # #[cfg(feature = "mock")]
/// # {
/// use pico_rally::platform::mock::MockFlash;
/// use pico_rally::platform::FlashInterface;
///
/// let mut flash = MockFlash::new();
/// flash.erase(0x046000, 4096).unwrap();
/// flash.write(0x046000, &[0x12, 0x34]).unwrap();
///
/// let mut buf = [0u8; 2];
/// flash.read(0x046000, &mut buf).unwrap();
/// assert_eq!(buf, [0x12, 0x34]);
/// assert_eq!(flash.erase_count(0x046000), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per block
    erase_counts: Vec<u32>,
    /// Number of successful write calls
    writes: u32,
    /// Simulated power loss on next write
    power_loss: bool,
}

impl MockFlash {
    /// Create a fully erased mock Flash
    pub fn new() -> Self {
        Self {
            storage: std::vec![0xFF; FLASH_CAPACITY as usize],
            erase_counts: std::vec![0; (FLASH_CAPACITY / BLOCK_SIZE) as usize],
            writes: 0,
            power_loss: false,
        }
    }

    /// Get Flash contents (for test verification)
    pub fn contents(&self, address: u32, len: usize) -> &[u8] {
        &self.storage[address as usize..address as usize + len]
    }

    /// Number of times the block containing `address` was erased
    pub fn erase_count(&self, address: u32) -> u32 {
        self.erase_counts[(address / BLOCK_SIZE) as usize]
    }

    /// Total erases across all blocks
    pub fn total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// Number of write calls that reached the array
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Make the next write only program the first half of its data
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    fn is_writable(&self, address: u32, len: usize) -> bool {
        address >= FIRMWARE_SIZE
            && (address as usize).saturating_add(len) <= FLASH_CAPACITY as usize
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        let start = address as usize;
        let end = start.saturating_add(buf.len());
        if end > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }

        buf.copy_from_slice(&self.storage[start..end]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address, data.len()) {
            return Err(FlashError::InvalidAddress.into());
        }

        let len = if self.power_loss {
            self.power_loss = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Programming can only clear bits
        let start = address as usize;
        for (cell, byte) in self.storage[start..start + len].iter_mut().zip(data) {
            *cell &= *byte;
        }
        self.writes += 1;

        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address, size as usize)
            || !address.is_multiple_of(BLOCK_SIZE)
            || !size.is_multiple_of(BLOCK_SIZE)
        {
            return Err(FlashError::InvalidAddress.into());
        }

        let start = address as usize;
        self.storage[start..start + size as usize].fill(0xFF);

        let first_block = (address / BLOCK_SIZE) as usize;
        let blocks = (size / BLOCK_SIZE) as usize;
        for count in &mut self.erase_counts[first_block..first_block + blocks] {
            *count += 1;
        }

        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_flash_starts_erased() {
        let flash = MockFlash::new();
        assert!(flash.contents(0x046000, 64).iter().all(|&b| b == 0xFF));
        assert_eq!(flash.total_erase_count(), 0);
    }

    #[test]
    fn test_mock_flash_read_write() {
        let mut flash = MockFlash::new();
        flash.write(0x046000, &[0x50, 0x41, 0x52, 0x41]).unwrap();

        let mut buf = [0u8; 4];
        flash.read(0x046000, &mut buf).unwrap();
        assert_eq!(buf, [0x50, 0x41, 0x52, 0x41]);
        assert_eq!(flash.write_count(), 1);
    }

    #[test]
    fn test_mock_flash_erase() {
        let mut flash = MockFlash::new();
        flash.write(0x046000, &[0x55; 256]).unwrap();
        flash.erase(0x046000, 4096).unwrap();

        assert!(flash.contents(0x046000, 256).iter().all(|&b| b == 0xFF));
        assert_eq!(flash.erase_count(0x046000), 1);
        assert_eq!(flash.erase_count(0x047000), 0);
    }

    #[test]
    fn test_mock_flash_write_only_clears_bits() {
        let mut flash = MockFlash::new();
        flash.write(0x046000, &[0x0F]).unwrap();
        flash.write(0x046000, &[0xF3]).unwrap();
        assert_eq!(flash.contents(0x046000, 1), &[0x03]);
    }

    #[test]
    fn test_mock_flash_invalid_address() {
        let mut flash = MockFlash::new();

        // Firmware region is protected
        assert!(flash.write(0x000000, &[0x00; 4]).is_err());
        assert!(flash.erase(0x000000, 4096).is_err());

        // Beyond capacity
        let mut buf = [0u8; 4];
        assert!(flash.read(FLASH_CAPACITY - 2, &mut buf).is_err());
        assert!(flash.write(FLASH_CAPACITY - 2, &[0; 4]).is_err());
    }

    #[test]
    fn test_mock_flash_unaligned_erase() {
        let mut flash = MockFlash::new();
        assert!(flash.erase(0x046100, 4096).is_err());
        assert!(flash.erase(0x046000, 1024).is_err());
    }

    #[test]
    fn test_mock_flash_power_loss() {
        let mut flash = MockFlash::new();
        flash.simulate_power_loss();
        flash.write(0x046000, &[0x55; 256]).unwrap();

        assert_eq!(flash.contents(0x046000, 128), &[0x55; 128]);
        assert_eq!(flash.contents(0x046080, 128), &[0xFF; 128]);

        // Only the next write is affected
        flash.write(0x046100, &[0x55; 16]).unwrap();
        assert_eq!(flash.contents(0x046100, 16), &[0x55; 16]);
    }
}
