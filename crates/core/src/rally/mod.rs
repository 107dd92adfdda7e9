//! Rally Points
//!
//! Rally points are alternate return locations used instead of home during
//! return-to-launch.
//!
//! # Storage
//!
//! - Fixed-size 15-byte records in a persistent region, addressed by slot
//! - Valid count kept in the `RALLY_TOTAL` parameter
//! - No caching: reads and writes go straight to the medium
//!
//! # Selection
//!
//! - Nearest valid rally point by horizontal distance, lowest index on ties
//! - Home at the RTL altitude when there are no rally points or the nearest
//!   is beyond `RALLY_LIMIT_KM` (0 = unlimited)

pub mod error;
pub mod location;
pub mod selection;
pub mod table;

pub use error::RallyError;
pub use location::{RallyFlags, RallyLocation, RALLY_WP_SIZE};
pub use selection::{rally_location_to_location, NearestRally, ReturnTarget, TargetSource};
pub use table::{Rally, RallyConfig, MAX_RALLY_POINTS};
