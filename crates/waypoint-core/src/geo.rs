//! Great-circle distance on a spherical Earth.

use crate::defaults::EARTH_RADIUS_METERS;
use crate::models::Coordinate;

/// Great-circle distance between two coordinates in meters (Haversine).
///
/// Uses a sphere of radius [`EARTH_RADIUS_METERS`]. Symmetric, never
/// negative, and exactly `0.0` for identical inputs.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Round a distance to the precision reported to clients and stored on
/// captures.
pub fn round_distance(meters: f64) -> f64 {
    let factor = 10f64.powi(crate::defaults::DISTANCE_DECIMALS);
    (meters * factor).round() / factor
}

/// Like [`round_distance`] but never rounds up past `limit`.
///
/// Rounding 39.996 gives 40.00, which would report a user as outside a
/// 39.998 m radius they were matched against. In that case the distance is
/// truncated to the reported precision instead.
pub fn round_distance_within(meters: f64, limit: f64) -> f64 {
    let rounded = round_distance(meters);
    if rounded <= limit {
        return rounded;
    }
    let factor = 10f64.powi(crate::defaults::DISTANCE_DECIMALS);
    (meters * factor).floor() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_identical_points_are_exactly_zero() {
        for c in [
            coord(0.0, 0.0),
            coord(48.8584, 2.2945),
            coord(-33.8568, 151.2153),
            coord(89.9999, -179.9999),
        ] {
            assert_eq!(haversine_distance(&c, &c), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let eiffel = coord(48.8584, 2.2945);
        let louvre = coord(48.8606, 2.3376);
        let there = haversine_distance(&eiffel, &louvre);
        let back = haversine_distance(&louvre, &eiffel);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance_paris_landmarks() {
        // Eiffel Tower to the Louvre is about 3.16 km.
        let d = haversine_distance(&coord(48.8584, 2.2945), &coord(48.8606, 2.3376));
        assert!((d - 3162.5).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance(&coord(0.0, 0.0), &coord(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * PI / 180.0;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_antipodal_points_are_half_circumference() {
        let d = haversine_distance(&coord(0.0, 0.0), &coord(0.0, 180.0));
        assert!(!d.is_nan());
        assert!((d - EARTH_RADIUS_METERS * PI).abs() < 1e-3);

        let d = haversine_distance(&coord(45.0, 10.0), &coord(-45.0, -170.0));
        assert!(!d.is_nan());
        assert!((d - EARTH_RADIUS_METERS * PI).abs() < 1.0);
    }

    #[test]
    fn test_distance_is_never_negative() {
        let points = [
            coord(10.0, 20.0),
            coord(-10.0, -20.0),
            coord(89.0, 179.0),
            coord(-89.0, -179.0),
        ];
        for a in &points {
            for b in &points {
                assert!(haversine_distance(a, b) >= 0.0);
            }
        }
    }

    #[test]
    fn test_round_distance_two_decimals() {
        assert_eq!(round_distance(12.3456), 12.35);
        assert_eq!(round_distance(12.344), 12.34);
        assert_eq!(round_distance(0.0), 0.0);
    }

    #[test]
    fn test_round_distance_within_does_not_cross_limit() {
        assert_eq!(round_distance_within(12.3456, 100.0), 12.35);
        assert_eq!(round_distance_within(39.996, 39.998), 39.99);
        assert_eq!(round_distance_within(39.996, 40.0), 40.0);
    }
}
