//! Navigation type definitions
//!
//! - `Location`: absolute geographic point with altitude

/// Absolute geographic location
///
/// Latitude/longitude use the MAVLink `*_INT` convention (degrees * 1e7) so
/// rally records convert without rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    /// Latitude in degrees * 1e7
    pub lat: i32,
    /// Longitude in degrees * 1e7
    pub lng: i32,
    /// Altitude in meters
    pub alt: f32,
}

impl Location {
    /// Create a location from scaled integer coordinates
    pub const fn new(lat: i32, lng: i32, alt: f32) -> Self {
        Self { lat, lng, alt }
    }

    /// Create a location from coordinates in degrees
    pub fn from_degrees(latitude: f64, longitude: f64, alt: f32) -> Self {
        Self {
            lat: libm::round(latitude * 1e7) as i32,
            lng: libm::round(longitude * 1e7) as i32,
            alt,
        }
    }

    /// Same horizontal position at a different altitude
    pub fn with_alt(self, alt: f32) -> Self {
        Self { alt, ..self }
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.lat as f64 / 1e7
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.lng as f64 / 1e7
    }

    /// True if both locations share a horizontal position
    pub fn same_position(&self, other: &Location) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }
}
