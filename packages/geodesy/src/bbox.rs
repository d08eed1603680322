//! Axis-aligned longitude/latitude bounding boxes.

use std::str::FromStr;

use geojson::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GeoPoint;

/// A bounding box in degrees, `west`/`east` being longitudes and
/// `south`/`north` latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary (min lng).
    pub west: f64,
    /// Southern latitude boundary (min lat).
    pub south: f64,
    /// Eastern longitude boundary (max lng).
    pub east: f64,
    /// Northern latitude boundary (max lat).
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// A degenerate box covering a single point.
    #[must_use]
    pub const fn from_point(point: GeoPoint) -> Self {
        Self::new(point.lng, point.lat, point.lng, point.lat)
    }

    /// Grows the box to include `lng`/`lat`.
    pub fn extend(&mut self, lng: f64, lat: f64) {
        self.west = self.west.min(lng);
        self.east = self.east.max(lng);
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
    }

    /// Whether `point` lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.west..=self.east).contains(&point.lng)
            && (self.south..=self.north).contains(&point.lat)
    }

    /// Standard AABB overlap test. Touching edges count as overlapping.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    /// Returns `(min_lng, min_lat, max_lng, max_lat)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.west, self.south, self.east, self.north)
    }
}

/// Error returned when a `"west,south,east,north"` string cannot be parsed.
#[derive(Debug, Error)]
pub enum BoundingBoxParseError {
    /// The string did not contain exactly four comma-separated values.
    #[error("expected 4 comma-separated values, found {0}")]
    WrongArity(usize),

    /// One of the values was not a number.
    #[error("invalid number '{value}'")]
    InvalidNumber {
        /// The offending value.
        value: String,
    },

    /// The box is inverted (`west > east` or `south > north`).
    #[error("bounding box is inverted")]
    Inverted,
}

impl FromStr for BoundingBox {
    type Err = BoundingBoxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BoundingBoxParseError::WrongArity(parts.len()));
        }

        let mut values = [0.0_f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BoundingBoxParseError::InvalidNumber {
                    value: (*part).to_string(),
                })?;
        }

        let [west, south, east, north] = values;
        if west > east || south > north {
            return Err(BoundingBoxParseError::Inverted);
        }

        Ok(Self::new(west, south, east, north))
    }
}

/// Computes the bounding box of a `GeoJSON` geometry by walking every
/// coordinate, recursing into geometry collections.
///
/// Returns `None` for geometries without any coordinates.
#[must_use]
pub fn bounding_box(geometry: &Value) -> Option<BoundingBox> {
    let mut acc: Option<BoundingBox> = None;
    walk(geometry, &mut acc);
    acc
}

/// AABB overlap test, see [`BoundingBox::intersects`].
#[must_use]
pub fn bbox_intersects(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.intersects(b)
}

fn walk(geometry: &Value, acc: &mut Option<BoundingBox>) {
    match geometry {
        Value::Point(position) => visit(position, acc),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter().for_each(|p| visit(p, acc));
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(|p| visit(p, acc));
        }
        Value::MultiPolygon(polygons) => {
            polygons.iter().flatten().flatten().for_each(|p| visit(p, acc));
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                walk(&geometry.value, acc);
            }
        }
    }
}

fn visit(position: &[f64], acc: &mut Option<BoundingBox>) {
    let (Some(&lng), Some(&lat)) = (position.first(), position.get(1)) else {
        return;
    };

    match acc {
        Some(bbox) => bbox.extend(lng, lat),
        None => *acc = Some(BoundingBox::new(lng, lat, lng, lat)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bbox_string() {
        let bbox: BoundingBox = "139.5, 35.5,140.0,35.9".parse().unwrap();
        assert_eq!(bbox, BoundingBox::new(139.5, 35.5, 140.0, 35.9));
    }

    #[test]
    fn rejects_malformed_bbox_strings() {
        assert!(matches!(
            "1,2,3".parse::<BoundingBox>(),
            Err(BoundingBoxParseError::WrongArity(3))
        ));
        assert!(matches!(
            "1,2,x,4".parse::<BoundingBox>(),
            Err(BoundingBoxParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            "10,2,3,4".parse::<BoundingBox>(),
            Err(BoundingBoxParseError::Inverted)
        ));
    }

    #[test]
    fn bounding_box_of_polygon() {
        let polygon = Value::Polygon(vec![vec![
            vec![139.0, 35.0],
            vec![139.0, 36.0],
            vec![140.5, 36.0],
            vec![140.5, 35.0],
            vec![139.0, 35.0],
        ]]);
        let bbox = bounding_box(&polygon).unwrap();
        assert_eq!(bbox.as_tuple(), (139.0, 35.0, 140.5, 36.0));
    }

    #[test]
    fn bounding_box_recurses_into_collections() {
        let collection = Value::GeometryCollection(vec![
            geojson::Geometry::new(Value::Point(vec![-10.0, 5.0])),
            geojson::Geometry::new(Value::MultiPolygon(vec![vec![vec![
                vec![20.0, -3.0],
                vec![21.0, -3.0],
                vec![21.0, 40.0],
                vec![20.0, -3.0],
            ]]])),
            geojson::Geometry::new(Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])),
        ]);
        let bbox = bounding_box(&collection).unwrap();
        assert_eq!(bbox.as_tuple(), (-10.0, -3.0, 21.0, 40.0));
    }

    #[test]
    fn bounding_box_of_empty_geometry_is_none() {
        assert!(bounding_box(&Value::MultiPoint(Vec::new())).is_none());
        assert!(bounding_box(&Value::GeometryCollection(Vec::new())).is_none());
    }

    #[test]
    fn intersection_is_symmetric_and_inclusive() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let touching = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        let apart = BoundingBox::new(11.0, 11.0, 12.0, 12.0);

        assert!(bbox_intersects(&a, &b) && bbox_intersects(&b, &a));
        assert!(bbox_intersects(&a, &touching));
        assert!(!bbox_intersects(&a, &apart));
        assert!(!bbox_intersects(&apart, &a));
    }

    #[test]
    fn contains_point() {
        let bbox = BoundingBox::new(139.0, 35.0, 140.0, 36.0);
        assert!(bbox.contains(GeoPoint::new(35.5, 139.5)));
        assert!(!bbox.contains(GeoPoint::new(36.5, 139.5)));
    }
}
