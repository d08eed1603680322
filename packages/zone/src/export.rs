//! `GeoJSON` rendering of zone circles.
//!
//! Produces `FeatureCollection`s whose properties are used directly as
//! paint expressions by the map layer.

use drone_map_geodesy::{circle_polygon, legacy::planar_circle_polygon};
use drone_map_zone_models::{ZoneColor, ZoneFacility};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use serde_json::json;

use crate::ZoneCatalog;

/// How circle polygons are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircleMethod {
    /// Geodesic destination-point circles.
    #[default]
    Geodesic,
    /// Planar degree-offset circles matching older exports.
    LegacyPlanar,
}

/// Builds a polygon feature for one facility.
#[must_use]
pub fn facility_feature(facility: &ZoneFacility, segments: u32, method: CircleMethod) -> Feature {
    let polygon = match method {
        CircleMethod::Geodesic => circle_polygon(facility.center, facility.radius_km, segments),
        CircleMethod::LegacyPlanar => {
            planar_circle_polygon(facility.center, facility.radius_km, segments)
        }
    };

    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), json!(facility.id));
    properties.insert("name".to_string(), json!(facility.name));
    properties.insert("category".to_string(), json!(facility.category.as_ref()));
    properties.insert("zoneColor".to_string(), json!(facility.zone_color.as_ref()));
    properties.insert("radiusKm".to_string(), json!(facility.radius_km));
    if let Some(red_id) = &facility.perimeter_of {
        properties.insert("perimeterOf".to_string(), json!(red_id));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&polygon))),
        id: Some(Id::String(facility.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Builds a collection from any sequence of facilities.
#[must_use]
pub fn feature_collection<'a>(
    facilities: impl IntoIterator<Item = &'a ZoneFacility>,
    segments: u32,
    method: CircleMethod,
) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: facilities
            .into_iter()
            .map(|f| facility_feature(f, segments, method))
            .collect(),
        foreign_members: None,
    }
}

impl ZoneCatalog {
    /// Renders the zones of one color. Yellow includes the generated
    /// perimeter rings around red facilities.
    #[must_use]
    pub fn to_feature_collection(
        &self,
        color: ZoneColor,
        segments: u32,
        method: CircleMethod,
    ) -> FeatureCollection {
        match color {
            ZoneColor::Red => feature_collection(self.by_zone(ZoneColor::Red), segments, method),
            ZoneColor::Yellow => feature_collection(&self.yellow_view(), segments, method),
        }
    }
}
