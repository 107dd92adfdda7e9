//! Mock platform implementation for testing
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

mod flash;

pub use flash::MockFlash;
