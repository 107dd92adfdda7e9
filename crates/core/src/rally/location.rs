//! Rally point record and its packed storage format.
//!
//! # Storage Layout
//!
//! Every slot holds one record packed little-endian with no padding:
//!
//! ```text
//! offset  size  field
//!      0     4  lat        i32  degrees * 1e7
//!      4     4  lng        i32  degrees * 1e7
//!      8     2  alt        i16  transit/loiter altitude above home (m)
//!     10     2  break_alt  i16  loiter break-out altitude for autoland (m)
//!     12     2  land_dir   u16  final approach heading (centidegrees)
//!     14     1  flags      u8   RallyFlags
//! ```
//!
//! The 15-byte width is shared with deployed vehicles and must not change.

use bitflags::bitflags;

/// Size of one packed rally point in storage
pub const RALLY_WP_SIZE: usize = 15;

/// Centidegrees in a full turn
const FULL_TURN_CD: u16 = 36000;

bitflags! {
    /// Rally point behavior flags
    ///
    /// Undefined bits are reserved. They are kept as stored, never rejected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RallyFlags: u8 {
        /// Seek favorable winds when choosing the landing approach
        const FAVORABLE_WIND = 0b0000_0001;
        /// Perform an automatic landing after arriving
        const AUTO_LAND = 0b0000_0010;
    }
}

impl Default for RallyFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rally point as stored on the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RallyLocation {
    /// Latitude in degrees * 1e7
    pub lat: i32,
    /// Longitude in degrees * 1e7
    pub lng: i32,
    /// Transit (and loiter) altitude above home in meters
    pub alt: i16,
    /// Altitude at which to break out of loiter when autolanding (meters)
    pub break_alt: i16,
    /// Desired landing direction in centidegrees
    pub land_dir: u16,
    /// Behavior flags
    pub flags: RallyFlags,
}

impl RallyLocation {
    /// Create a rally point with no landing preferences
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in degrees * 1e7
    /// * `lng` - Longitude in degrees * 1e7
    /// * `alt` - Transit altitude above home in meters
    pub fn new(lat: i32, lng: i32, alt: i16) -> Self {
        Self {
            lat,
            lng,
            alt,
            ..Self::default()
        }
    }

    /// Landing direction normalized to 0-35999 centidegrees
    pub fn land_direction_cd(&self) -> u16 {
        self.land_dir % FULL_TURN_CD
    }

    /// Landing direction in degrees (0 to <360)
    pub fn land_direction_deg(&self) -> f32 {
        f32::from(self.land_direction_cd()) / 100.0
    }

    /// Whether the landing approach should seek favorable winds
    pub fn favorable_wind(&self) -> bool {
        self.flags.contains(RallyFlags::FAVORABLE_WIND)
    }

    /// Whether to land automatically after arriving
    pub fn auto_land(&self) -> bool {
        self.flags.contains(RallyFlags::AUTO_LAND)
    }

    /// Serialize to the packed storage format (little-endian)
    pub fn to_bytes(&self) -> [u8; RALLY_WP_SIZE] {
        let mut buf = [0u8; RALLY_WP_SIZE];
        buf[0..4].copy_from_slice(&self.lat.to_le_bytes());
        buf[4..8].copy_from_slice(&self.lng.to_le_bytes());
        buf[8..10].copy_from_slice(&self.alt.to_le_bytes());
        buf[10..12].copy_from_slice(&self.break_alt.to_le_bytes());
        buf[12..14].copy_from_slice(&self.land_dir.to_le_bytes());
        buf[14] = self.flags.bits();
        buf
    }

    /// Deserialize from the packed storage format (little-endian)
    ///
    /// Never fails: whatever bytes are in the slot become a record.
    pub fn from_bytes(buf: &[u8; RALLY_WP_SIZE]) -> Self {
        Self {
            lat: i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            lng: i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            alt: i16::from_le_bytes([buf[8], buf[9]]),
            break_alt: i16::from_le_bytes([buf[10], buf[11]]),
            land_dir: u16::from_le_bytes([buf[12], buf[13]]),
            flags: RallyFlags::from_bits_retain(buf[14]),
        }
    }
}
