//! Legacy planar circle approximation.
//!
//! Older zone exports built circles by offsetting the centre by a fixed
//! number of kilometres per degree (111.32 km, with longitude scaled by
//! `cos(lat)`). The result looks like [`crate::circle_polygon`] on a map
//! but the vertices are not at exactly `radius_km` great-circle distance.
//! Only use this when output must match those exports vertex for vertex.

use geo::{Coord, LineString, Polygon};

use crate::GeoPoint;

/// Kilometres per degree of latitude assumed by the legacy generator.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Builds a circle polygon with the legacy planar degree offset.
///
/// Vertex `i` sits at angle `2πi / segments` measured counter-clockwise
/// from east; the ring is closed by repeating the first vertex.
#[must_use]
pub fn planar_circle_polygon(center: GeoPoint, radius_km: f64, segments: u32) -> Polygon<f64> {
    let segments = segments.max(3);
    let d_lat = radius_km / KM_PER_DEGREE;
    let d_lng = radius_km / (KM_PER_DEGREE * center.lat.to_radians().cos());

    let coords: Vec<Coord<f64>> = (0..=segments)
        .map(|i| {
            let angle = f64::from(i % segments) / f64::from(segments) * std::f64::consts::TAU;
            Coord {
                x: d_lng.mul_add(angle.cos(), center.lng),
                y: d_lat.mul_add(angle.sin(), center.lat),
            }
        })
        .collect();

    Polygon::new(LineString::from(coords), Vec::new())
}
