//! Geospatial primitives: great-circle distance and geofence tests
//!
//! Pure functions on a spherical-earth approximation. Good to a few
//! metres over depot-to-destination distances, which is all the custody
//! chain needs.

use custody_core::{GeoPoint, ZoneShape};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters (spherical approximation)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine)
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether `point` lies within a circular geofence
pub fn point_in_circle(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    haversine_distance(point, center) <= radius_meters
}

/// Ray-casting parity test over an ordered, closed ring of vertices.
///
/// A point exactly on a polygon edge is implementation-defined: the
/// parity test may report it either way depending on edge orientation.
/// Rings with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: GeoPoint, ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = ring[i];
        let vj = ring[j];
        if (vi.lat > point.lat) != (vj.lat > point.lat)
            && point.lon
                < (vj.lon - vi.lon) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Containment test dispatching on zone geometry
pub fn point_in_zone(point: GeoPoint, shape: &ZoneShape) -> bool {
    match shape {
        ZoneShape::Circle {
            center,
            radius_meters,
        } => point_in_circle(point, *center, *radius_meters),
        ZoneShape::Polygon { ring } => point_in_polygon(point, ring),
    }
}

/// A route point that strayed outside its corridor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorDeviation {
    /// Index of the point in the route
    pub point_index: usize,

    /// The deviating point
    pub point: GeoPoint,

    /// Minimum distance from the corridor centerline (m)
    pub distance_from_corridor_m: f64,

    /// How far beyond the corridor half-width the point strayed (m)
    pub exceeds_by_m: f64,
}

/// Lazily scan `route` against a corridor defined by `centerline` and a
/// total width, yielding one [`CorridorDeviation`] per point whose
/// minimum distance to any centerline vertex exceeds half the width.
///
/// The iterator borrows its inputs and is finite; calling the function
/// again restarts the scan. An empty centerline flags every point.
pub fn corridor_deviations<'a>(
    route: &'a [GeoPoint],
    centerline: &'a [GeoPoint],
    corridor_width_meters: f64,
) -> impl Iterator<Item = CorridorDeviation> + 'a {
    let half_width = corridor_width_meters / 2.0;
    route
        .iter()
        .copied()
        .enumerate()
        .filter_map(move |(point_index, point)| {
            let min_distance = centerline
                .iter()
                .map(|&c| haversine_distance(point, c))
                .fold(f64::INFINITY, f64::min);
            if min_distance > half_width {
                Some(CorridorDeviation {
                    point_index,
                    point,
                    distance_from_corridor_m: min_distance,
                    exceeds_by_m: min_distance - half_width,
                })
            } else {
                None
            }
        })
}
