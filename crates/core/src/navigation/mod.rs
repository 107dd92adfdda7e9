//! Navigation types and geographic math

pub mod geo;
pub mod types;

pub use geo::{get_distance, longitude_scale, offset_location};
pub use types::Location;
