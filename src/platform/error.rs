//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

use pico_rally_core::traits::StorageError;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid configuration provided
    InvalidConfig,
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Erase operation failed
    EraseFailed,
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
    /// Invalid address (out of bounds, protected, or misaligned)
    InvalidAddress,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "Flash error: {:?}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

impl PlatformError {
    /// Map to a rally storage error
    ///
    /// Address errors become `OutOfBounds`; anything else becomes `fallback`,
    /// which the caller picks according to the direction of the transfer.
    pub fn to_storage_error(self, fallback: StorageError) -> StorageError {
        match self {
            PlatformError::Flash(FlashError::InvalidAddress) => StorageError::OutOfBounds,
            _ => fallback,
        }
    }
}
