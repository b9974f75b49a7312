//! Property-based tests for the geospatial primitives

use custody_core::GeoPoint;
use fraud_engine::geo::{haversine_distance, point_in_circle};
use proptest::prelude::*;

proptest! {
    /// Distance is symmetric
    #[test]
    fn haversine_symmetric(
        lat1 in -85.0f64..85.0, lon1 in -180.0f64..180.0,
        lat2 in -85.0f64..85.0, lon2 in -180.0f64..180.0,
    ) {
        let a = GeoPoint::new(lat1, lon1);
        let b = GeoPoint::new(lat2, lon2);
        let ab = haversine_distance(a, b);
        let ba = haversine_distance(b, a);
        prop_assert!((ab - ba).abs() < 1e-6);
    }

    /// Distance is non-negative and bounded by half the earth's circumference
    #[test]
    fn haversine_bounded(
        lat1 in -85.0f64..85.0, lon1 in -180.0f64..180.0,
        lat2 in -85.0f64..85.0, lon2 in -180.0f64..180.0,
    ) {
        let d = haversine_distance(GeoPoint::new(lat1, lon1), GeoPoint::new(lat2, lon2));
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * 6_371_000.0 + 1.0);
    }

    /// A point is always inside a circle centered on itself
    #[test]
    fn point_in_own_circle(
        lat in -85.0f64..85.0, lon in -180.0f64..180.0,
        radius in 0.0f64..1_000_000.0,
    ) {
        let p = GeoPoint::new(lat, lon);
        prop_assert!(point_in_circle(p, p, radius));
    }
}
