#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spherical geodesy primitives shared by the zone and surface engines.
//!
//! All distances are great-circle distances on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Coordinates are WGS84 degrees; when converted to
//! [`geo`] types, `x` is longitude and `y` is latitude.

pub mod bbox;
pub mod legacy;

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

pub use bbox::{BoundingBox, BoundingBoxParseError, bbox_intersects, bounding_box};

/// Mean Earth radius used by every distance computation, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Number of segments used when approximating a circle as a polygon.
pub const DEFAULT_CIRCLE_SEGMENTS: u32 = 32;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, `-90..=90`.
    pub lat: f64,
    /// Longitude, `-180..=180`.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether the latitude and longitude are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Converts to a [`geo`] coordinate (`x = lng`, `y = lat`).
    #[must_use]
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.lng, point.lat)
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Great-circle distance between two points (haversine), in kilometres.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push `h` a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Initial bearing from `from` towards `to`, in degrees `0..360`
/// clockwise from true north.
#[must_use]
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_lambda = (to.lng - from.lng).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos().mul_add(phi2.sin(), -(phi1.sin() * phi2.cos() * d_lambda.cos()));

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Solves the direct geodesic problem on the sphere: the point reached
/// by travelling `distance_km` from `origin` along `bearing_deg`.
#[must_use]
pub fn destination_point(origin: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let delta = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_deg.to_radians();
    let phi1 = origin.lat.to_radians();
    let lambda1 = origin.lng.to_radians();

    let sin_phi2 = phi1
        .sin()
        .mul_add(delta.cos(), phi1.cos() * delta.sin() * theta.cos());
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    GeoPoint::new(phi2.to_degrees(), normalize_lng(lambda2.to_degrees()))
}

/// Approximates a geodesic circle as a closed polygon.
///
/// Produces `segments + 1` vertices at evenly spaced bearings starting at
/// 0°, the last vertex repeating the first so the ring is closed. Fewer
/// than three segments are raised to three.
#[must_use]
pub fn circle_polygon(center: GeoPoint, radius_km: f64, segments: u32) -> Polygon<f64> {
    let segments = segments.max(3);
    let step = 360.0 / f64::from(segments);

    let coords: Vec<Coord<f64>> = (0..=segments)
        .map(|i| {
            let bearing = f64::from(i % segments) * step;
            destination_point(center, radius_km, bearing).to_coord()
        })
        .collect();

    Polygon::new(LineString::from(coords), Vec::new())
}

/// Densifies a polyline along great circles so consecutive samples are
/// at most `step_km` apart.
///
/// Every input vertex is kept. A non-positive or non-finite `step_km`
/// returns the vertices unchanged.
#[must_use]
pub fn sample_path(path: &[GeoPoint], step_km: f64) -> Vec<GeoPoint> {
    if !(step_km.is_finite() && step_km > 0.0) {
        return path.to_vec();
    }

    let mut samples = Vec::with_capacity(path.len());
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let length = distance_km(from, to);
        let bearing = initial_bearing(from, to);

        samples.push(from);
        let mut travelled = step_km;
        while travelled < length {
            samples.push(destination_point(from, travelled, bearing));
            travelled += step_km;
        }
    }
    if let Some(last) = path.last() {
        samples.push(*last);
    }

    samples
}

/// Wraps a longitude in degrees into `-180..=180`.
#[must_use]
pub fn normalize_lng(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 540.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO_STATION: GeoPoint = GeoPoint::new(35.6812, 139.7671);
    const OSAKA_STATION: GeoPoint = GeoPoint::new(34.7025, 135.4959);

    #[test]
    fn distance_is_zero_for_same_point() {
        assert!(distance_km(TOKYO_STATION, TOKYO_STATION).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_km(TOKYO_STATION, OSAKA_STATION);
        let ba = distance_km(OSAKA_STATION, TOKYO_STATION);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn distance_tokyo_to_osaka() {
        // Roughly 400 km as the crow flies.
        let d = distance_km(TOKYO_STATION, OSAKA_STATION);
        assert!((395.0..410.0).contains(&d), "unexpected distance {d}");
    }

    #[test]
    fn distance_satisfies_triangle_inequality() {
        let nagoya = GeoPoint::new(35.1709, 136.8815);
        let direct = distance_km(TOKYO_STATION, OSAKA_STATION);
        let via = distance_km(TOKYO_STATION, nagoya) + distance_km(nagoya, OSAKA_STATION);
        assert!(direct <= via + 1e-9);
    }

    #[test]
    fn destination_round_trips_distance_and_bearing() {
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0, 333.0] {
            let dest = destination_point(TOKYO_STATION, 12.5, bearing);
            let d = distance_km(TOKYO_STATION, dest);
            assert!((d - 12.5).abs() < 1e-6, "bearing {bearing}: {d}");

            let back = initial_bearing(TOKYO_STATION, dest);
            let diff = ((back - bearing + 540.0) % 360.0 - 180.0).abs();
            assert!(diff < 1e-6, "bearing {bearing} came back as {back}");
        }
    }

    #[test]
    fn destination_wraps_across_antimeridian() {
        let dest = destination_point(GeoPoint::new(0.0, 179.9), 50.0, 90.0);
        assert!(dest.lng < -179.0, "expected wrap, got {}", dest.lng);
        assert!(dest.is_valid());
    }

    #[test]
    fn circle_polygon_is_closed_with_expected_vertex_count() {
        let circle = circle_polygon(TOKYO_STATION, 1.0, DEFAULT_CIRCLE_SEGMENTS);
        let ring = &circle.exterior().0;
        assert_eq!(ring.len(), DEFAULT_CIRCLE_SEGMENTS as usize + 1);
        assert_eq!(ring.first(), ring.last());
        assert!(circle.interiors().is_empty());
    }

    #[test]
    fn circle_polygon_vertices_lie_on_radius() {
        let radius = 3.2;
        let circle = circle_polygon(OSAKA_STATION, radius, 64);
        for coord in &circle.exterior().0 {
            let d = distance_km(OSAKA_STATION, GeoPoint::from(*coord));
            assert!((d - radius).abs() < 1e-6, "vertex at {d} km");
        }
    }

    #[test]
    fn circle_polygon_clamps_segment_count() {
        let circle = circle_polygon(TOKYO_STATION, 1.0, 1);
        assert_eq!(circle.exterior().0.len(), 4);
    }

    #[test]
    fn sample_path_respects_step() {
        let path = [TOKYO_STATION, GeoPoint::new(35.6812, 139.9)];
        let samples = sample_path(&path, 0.5);

        assert_eq!(samples.first(), Some(&TOKYO_STATION));
        assert_eq!(samples.last(), path.last());
        for pair in samples.windows(2) {
            assert!(distance_km(pair[0], pair[1]) <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn sample_path_without_step_keeps_vertices() {
        let path = [TOKYO_STATION, OSAKA_STATION];
        assert_eq!(sample_path(&path, 0.0), path.to_vec());
        assert!(sample_path(&[], 1.0).is_empty());
    }

    #[test]
    fn validates_coordinate_ranges() {
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(90.1, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn normalizes_longitude() {
        assert!((normalize_lng(190.0) - -170.0).abs() < 1e-9);
        assert!((normalize_lng(-190.0) - 170.0).abs() < 1e-9);
        assert!((normalize_lng(45.0) - 45.0).abs() < 1e-9);
    }
}
