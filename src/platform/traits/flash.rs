//! Flash interface trait
//!
//! This module defines the Flash storage interface that platform implementations must provide.
//! Flash holds parameter blocks and the rally point region.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for Flash read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in blocks (typically 4 KB on RP2040/RP2350)
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first to reset to 1)
/// - Flash operations are blocking
///
/// # Memory Layout (RP2040/RP2350)
///
/// ```text
/// [Firmware]           0x000000 - 0x040000 (256 KB) - DO NOT WRITE
/// [Parameter Blocks]   0x040000 - 0x044000 (16 KB)
/// [Mission Storage]    0x044000 - 0x046000 (8 KB)
/// [Rally Points]       0x046000 - 0x048000 (8 KB, two banks)
/// ```
pub trait FlashInterface {
    /// Read `buf.len()` bytes from Flash starting at `address`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` to Flash starting at `address`
    ///
    /// Only clears bits; the caller must erase the target region first
    /// unless every written bit is already set.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is in firmware region.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `address`, setting them to 0xFF
    ///
    /// Address and size must be aligned to `block_size()`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` for protected or
    /// misaligned ranges, `PlatformError::Flash(FlashError::EraseFailed)` if the erase fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Minimum erasable unit size in bytes
    fn block_size(&self) -> u32;

    /// Total Flash capacity in bytes
    fn capacity(&self) -> u32;
}
