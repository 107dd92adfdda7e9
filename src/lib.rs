#![cfg_attr(not(test), no_std)]

//! pico_rally - Rally point storage and return-to-launch target selection
//!
//! This library stores rally points in Flash and picks the return target
//! for RTL. The platform-independent logic lives in `pico_rally_core`; this
//! crate adds the Flash backend, parameter wiring and logging.

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

// Platform abstraction layer (Flash access)
pub mod platform;

// Core services (logging)
pub mod core;

// Rally point Flash storage and RTL integration
pub mod rally;

pub use pico_rally_core;
