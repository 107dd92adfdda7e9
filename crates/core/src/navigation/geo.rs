//! Geographic calculations on scaled integer coordinates
//!
//! Uses the flat-earth approximation common to autopilots: within the few
//! tens of kilometers a vehicle covers, the error against a great-circle
//! distance is well under 0.1%. All math is `f64` so 1e-7 degree resolution
//! is not lost.

use libm::{cos, round, sqrt};

use super::types::Location;

/// Meters per 1e-7 degree of latitude (equatorial, WGS84 semi-major axis)
pub const LOCATION_SCALING_FACTOR: f64 = 0.011_131_884_502_145_034;

/// 1e-7 degrees of latitude per meter
pub const LOCATION_SCALING_FACTOR_INV: f64 = 89.832_049_533_689_22;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

/// Half a turn in degrees * 1e7
const HALF_TURN: i64 = 1_800_000_000;

/// Latitude limit in degrees * 1e7
const MAX_LAT: f64 = 900_000_000.0;

/// Shrink factor of a longitude step at latitude `lat` (degrees * 1e7)
///
/// Floored at 0.01 so positions near the poles do not divide by zero.
pub fn longitude_scale(lat: i32) -> f64 {
    let scale = cos(lat as f64 * 1e-7 * DEG_TO_RAD);
    scale.max(0.01)
}

/// Horizontal distance in meters between two locations
///
/// Altitude is ignored. The longitude step is scaled at the mean latitude,
/// which keeps the result symmetric in its arguments.
pub fn get_distance(a: &Location, b: &Location) -> f64 {
    let dlat = b.lat as f64 - a.lat as f64;
    let dlng = diff_longitude(a.lng, b.lng) as f64 * longitude_scale(mean_latitude(a.lat, b.lat));
    sqrt(dlat * dlat + dlng * dlng) * LOCATION_SCALING_FACTOR
}

/// Move `loc` by the given north/east offsets in meters
///
/// Altitude is carried over unchanged. Latitude saturates at the poles and
/// longitude wraps across the antimeridian.
pub fn offset_location(loc: &Location, north_m: f64, east_m: f64) -> Location {
    let lat = round(loc.lat as f64 + north_m * LOCATION_SCALING_FACTOR_INV).clamp(-MAX_LAT, MAX_LAT)
        as i32;
    let dlng = east_m * LOCATION_SCALING_FACTOR_INV / longitude_scale(mean_latitude(loc.lat, lat));
    let lng = wrap_longitude(loc.lng as i64 + round(dlng) as i64);

    Location {
        lat,
        lng,
        alt: loc.alt,
    }
}

fn mean_latitude(lat1: i32, lat2: i32) -> i32 {
    ((lat1 as i64 + lat2 as i64) / 2) as i32
}

/// Signed longitude step from `lng1` to `lng2`, the short way round
fn diff_longitude(lng1: i32, lng2: i32) -> i64 {
    let diff = lng2 as i64 - lng1 as i64;
    if diff > HALF_TURN {
        diff - 2 * HALF_TURN
    } else if diff < -HALF_TURN {
        diff + 2 * HALF_TURN
    } else {
        diff
    }
}

fn wrap_longitude(lng: i64) -> i32 {
    let mut lng = lng;
    while lng > HALF_TURN {
        lng -= 2 * HALF_TURN;
    }
    while lng < -HALF_TURN {
        lng += 2 * HALF_TURN;
    }
    lng as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO: Location = Location::new(356762000, 1396503000, 0.0);

    #[test]
    fn test_distance_zero() {
        assert_eq!(get_distance(&TOKYO, &TOKYO), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Location::new(350000000, 1390000000, 0.0);
        let b = Location::new(360000000, 1390000000, 0.0);
        // ~111.3 km per degree of latitude
        assert!((get_distance(&a, &b) - 111_318.8).abs() < 1.0);
    }

    #[test]
    fn test_distance_longitude_shrinks_with_latitude() {
        let equator = get_distance(
            &Location::new(0, 0, 0.0),
            &Location::new(0, 10000000, 0.0),
        );
        let sixty = get_distance(
            &Location::new(600000000, 0, 0.0),
            &Location::new(600000000, 10000000, 0.0),
        );
        // cos(60 deg) = 0.5
        assert!((sixty - equator * 0.5).abs() < 1.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Location::new(356762000, 1396503000, 0.0);
        let b = Location::new(357262000, 1397503000, 0.0);
        assert_eq!(get_distance(&a, &b), get_distance(&b, &a));
    }

    #[test]
    fn test_distance_ignores_altitude() {
        let high = TOKYO.with_alt(3000.0);
        assert_eq!(get_distance(&TOKYO, &high), 0.0);
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let east = Location::new(0, 1799999000, 0.0);
        let west = Location::new(0, -1799999000, 0.0);
        // 2000 * 1e-7 degrees apart, not most of the way round the globe
        let distance = get_distance(&east, &west);
        assert!((distance - 2000.0 * LOCATION_SCALING_FACTOR).abs() < 1e-6);
    }

    #[test]
    fn test_scaling_factors_are_inverse() {
        assert!((LOCATION_SCALING_FACTOR * LOCATION_SCALING_FACTOR_INV - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_20km_round_trip() {
        let moved = offset_location(&TOKYO, 20_000.0, 0.0);
        assert!((get_distance(&TOKYO, &moved) - 20_000.0).abs() < 0.01);

        let moved = offset_location(&TOKYO, 0.0, -20_000.0);
        assert!((get_distance(&TOKYO, &moved) - 20_000.0).abs() < 0.05);
    }

    #[test]
    fn test_offset_north_round_trip() {
        let moved = offset_location(&TOKYO, 3000.0, 0.0);
        assert_eq!(moved.lng, TOKYO.lng);
        assert!(moved.lat > TOKYO.lat);
        assert!((get_distance(&TOKYO, &moved) - 3000.0).abs() < 0.05);
    }

    #[test]
    fn test_offset_east_round_trip() {
        let moved = offset_location(&TOKYO, 0.0, 5000.0);
        assert_eq!(moved.lat, TOKYO.lat);
        assert!(moved.lng > TOKYO.lng);
        assert!((get_distance(&TOKYO, &moved) - 5000.0).abs() < 0.05);
    }

    #[test]
    fn test_offset_diagonal_round_trip() {
        let moved = offset_location(&TOKYO, -3000.0, -4000.0);
        assert!((get_distance(&TOKYO, &moved) - 5000.0).abs() < 0.5);
    }

    #[test]
    fn test_offset_keeps_altitude() {
        let moved = offset_location(&TOKYO.with_alt(120.0), 10.0, 10.0);
        assert_eq!(moved.alt, 120.0);
    }

    #[test]
    fn test_offset_wraps_antimeridian() {
        let start = Location::new(0, 1799999000, 0.0);
        let moved = offset_location(&start, 0.0, 1000.0);
        assert!(moved.lng < 0);
        assert!((get_distance(&start, &moved) - 1000.0).abs() < 0.05);
    }

    #[test]
    fn test_offset_saturates_at_pole() {
        let start = Location::new(899000000, 0, 0.0);
        let moved = offset_location(&start, 1_000_000.0, 0.0);
        assert_eq!(moved.lat, 900000000);
    }

    #[test]
    fn test_longitude_scale_floor() {
        assert!((longitude_scale(0) - 1.0).abs() < 1e-12);
        assert!((longitude_scale(900000000) - 0.01).abs() < 1e-12);
    }
}
