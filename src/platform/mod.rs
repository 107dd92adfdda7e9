//! Platform abstraction layer
//!
//! Hardware access is isolated behind the traits in this module.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result};
pub use traits::FlashInterface;
