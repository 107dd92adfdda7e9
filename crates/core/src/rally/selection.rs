//! Return-to-launch target selection
//!
//! Picks the nearest stored rally point, or home when there are no rally
//! points or the nearest one is beyond `RALLY_LIMIT_KM`. Only the single
//! nearest point is checked against the limit; a farther point is never
//! tried instead.

use super::location::RallyLocation;
use super::table::Rally;
use crate::navigation::{get_distance, Location};
use crate::traits::{HomeSource, RallyStorage};

/// Nearest rally point to a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestRally {
    /// Slot index of the rally point
    pub index: u8,
    /// Stored record
    pub rally: RallyLocation,
    /// Record resolved against home
    pub location: Location,
    /// Horizontal distance from the query position in meters
    pub distance_m: f64,
}

/// Why a return target was chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSource {
    /// Nearest rally point, within the limit
    Rally {
        /// Slot index of the rally point
        index: u8,
        /// Horizontal distance in meters
        distance_m: f64,
    },
    /// No rally points stored
    HomeNoRallyPoints,
    /// Nearest rally point is farther than the distance limit
    HomeBeyondLimit {
        /// Slot index of the rejected rally point
        index: u8,
        /// Horizontal distance in meters
        distance_m: f64,
    },
}

/// Resolved return-to-launch target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnTarget {
    /// Absolute target location
    pub location: Location,
    /// Reason for the choice
    pub source: TargetSource,
}

impl ReturnTarget {
    /// True if the target is home rather than a rally point
    pub fn is_home(&self) -> bool {
        !matches!(self.source, TargetSource::Rally { .. })
    }
}

/// Convert a stored rally point to an absolute location
///
/// Latitude and longitude are used verbatim; the altitude is the rally
/// point's transit altitude on top of home's absolute altitude.
pub fn rally_location_to_location(rally: &RallyLocation, home: &Location) -> Location {
    Location {
        lat: rally.lat,
        lng: rally.lng,
        alt: home.alt + f32::from(rally.alt),
    }
}

impl<S: RallyStorage, H: HomeSource> Rally<S, H> {
    /// Resolve a rally point against the current home
    pub fn resolve_location(&self, rally: &RallyLocation) -> Location {
        rally_location_to_location(rally, &self.home.home_location())
    }

    /// Find the rally point closest to `current`
    ///
    /// Scans slots `0..total()` in order and keeps the first of any equally
    /// distant points. Slots that fail to read are skipped. Returns `None`
    /// when no rally point could be read.
    pub fn find_nearest(&mut self, current: &Location) -> Option<NearestRally> {
        let home = self.home.home_location();
        let mut nearest: Option<NearestRally> = None;

        for index in 0..self.total() {
            let Ok(rally) = self.get(index) else {
                continue;
            };

            let location = rally_location_to_location(&rally, &home);
            let distance_m = get_distance(current, &location);

            if nearest.is_none_or(|best| distance_m < best.distance_m) {
                nearest = Some(NearestRally {
                    index,
                    rally,
                    location,
                    distance_m,
                });
            }
        }

        nearest
    }

    /// Choose the return-to-launch target and report why
    ///
    /// Home targets use `rtl_home_alt` as their altitude; rally targets use
    /// their own resolved transit altitude.
    pub fn select_target(&mut self, current: &Location, rtl_home_alt: f32) -> ReturnTarget {
        let home = self.home.home_location().with_alt(rtl_home_alt);

        let Some(nearest) = self.find_nearest(current) else {
            return ReturnTarget {
                location: home,
                source: TargetSource::HomeNoRallyPoints,
            };
        };

        match self.params.limit_m() {
            Some(limit_m) if nearest.distance_m > limit_m => ReturnTarget {
                location: home,
                source: TargetSource::HomeBeyondLimit {
                    index: nearest.index,
                    distance_m: nearest.distance_m,
                },
            },
            _ => ReturnTarget {
                location: nearest.location,
                source: TargetSource::Rally {
                    index: nearest.index,
                    distance_m: nearest.distance_m,
                },
            },
        }
    }

    /// Best rally point or home location for return-to-launch
    pub fn best_location(&mut self, current: &Location, rtl_home_alt: f32) -> Location {
        self.select_target(current, rtl_home_alt).location
    }
}
