//! Geographic utilities: distances, centers, and degree/meter conversion.

use crate::TripPoint;

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two trip points, in meters.
pub fn haversine_distance(a: &TripPoint, b: &TripPoint) -> f64 {
    haversine_coords(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Haversine great-circle distance between two raw coordinates, in meters.
pub fn haversine_coords(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Arithmetic mean coordinate of a point set as (latitude, longitude).
///
/// Returns (0.0, 0.0) for an empty slice.
pub fn compute_center(points: &[TripPoint]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let lat: f64 = points.iter().map(|p| p.latitude).sum();
    let lng: f64 = points.iter().map(|p| p.longitude).sum();
    (lat / n, lng / n)
}

/// Convert a distance in meters to degrees of longitude at a given latitude.
///
/// Also a safe over-approximation for latitude degrees, since a meridian
/// degree is never shorter than a parallel degree.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let meters_per_degree = 111_320.0 * latitude.to_radians().cos().abs().max(0.01);
    meters / meters_per_degree
}

/// Project a coordinate to planar meters relative to a reference point.
///
/// Equirectangular approximation, accurate at the sub-kilometer scales the
/// binning and clustering stages operate on. Returns `[x_east, y_north]`.
pub fn project_to_meters(lat: f64, lng: f64, ref_lat: f64, ref_lng: f64) -> [f64; 2] {
    let x = (lng - ref_lng).to_radians() * ref_lat.to_radians().cos() * EARTH_RADIUS_M;
    let y = (lat - ref_lat).to_radians() * EARTH_RADIUS_M;
    [x, y]
}

/// Euclidean distance between two planar points, in meters.
pub fn planar_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}
