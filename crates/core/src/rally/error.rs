//! Rally error types

use core::fmt;

use crate::parameters::ParameterError;
use crate::traits::StorageError;

/// Errors from rally point storage operations
///
/// None of these are fatal. Selection never returns an error: missing or
/// distant rally points fall back to home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RallyError {
    /// Slot index is at or beyond the limit (count for reads, capacity for writes)
    IndexOutOfRange {
        /// Requested slot
        index: u8,
        /// First invalid slot
        limit: u8,
    },
    /// Requested rally point count does not fit the table
    TotalExceedsCapacity {
        /// Requested count
        total: u8,
        /// Table capacity
        capacity: u8,
    },
    /// Invalid table configuration or parameter value
    InvalidConfig,
    /// Storage medium failed
    Storage(StorageError),
    /// Parameter store rejected an update
    Parameter(ParameterError),
}

impl fmt::Display for RallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RallyError::IndexOutOfRange { index, limit } => {
                write!(f, "rally index {} out of range (limit {})", index, limit)
            }
            RallyError::TotalExceedsCapacity { total, capacity } => {
                write!(f, "rally total {} exceeds capacity {}", total, capacity)
            }
            RallyError::InvalidConfig => write!(f, "invalid rally configuration"),
            RallyError::Storage(e) => write!(f, "rally storage error: {}", e),
            RallyError::Parameter(e) => write!(f, "rally parameter error: {}", e),
        }
    }
}

impl From<StorageError> for RallyError {
    fn from(error: StorageError) -> Self {
        RallyError::Storage(error)
    }
}

impl From<ParameterError> for RallyError {
    fn from(error: ParameterError) -> Self {
        RallyError::Parameter(error)
    }
}
