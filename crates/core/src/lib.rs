//! pico_rally_core - Pure no_std rally point logic
//!
//! This crate contains the platform-agnostic rally point table and
//! return-to-launch target selection. It can be tested on host without any
//! feature flags or embedded dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies, no allocation
//! - **Trait abstractions**: Storage medium and home position injected via traits
//!
//! # Modules
//!
//! - [`rally`]: Rally point records, table and selection
//! - [`navigation`]: `Location` and flat-earth distance math
//! - [`parameters`]: Parameter store and rally parameters
//! - [`traits`]: Storage and home abstractions with mocks

#![no_std]

pub mod navigation;
pub mod parameters;
pub mod rally;
pub mod traits;
