//! Injected capabilities for rally point storage and selection.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Flash-backed implementations live in the firmware crate

pub mod home;
pub mod storage;

pub use home::{HomeSource, MockHome};
pub use storage::{MemoryStorage, RallyStorage, StorageError};
