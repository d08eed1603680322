#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Compiled-in catalog of circular restricted-airspace facilities.
//!
//! The catalog is loaded once from the TOML files embedded by
//! [`registry`], validated, and then only ever read. All queries are
//! linear scans in catalog order; with a few hundred facilities that is
//! cheaper than maintaining a spatial index.
//!
//! Containment is radius based: a point is inside a facility's zone when
//! its great-circle distance to the centre is at most `radius_km`.

pub mod export;
pub mod registry;

use std::collections::BTreeSet;
use std::sync::Arc;

use drone_map_geodesy::{GeoPoint, distance_km, sample_path};
use drone_map_zone_models::{FacilityCategory, NearbyFacility, ZoneCheck, ZoneColor, ZoneFacility};
use thiserror::Error;

/// Width of the yellow ring generated around every red-zone facility.
pub const PERIMETER_BUFFER_KM: f64 = 0.3;

/// Catalog integrity violations. These are fatal at load time.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two facilities share an id.
    #[error("Duplicate facility id: {id}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },

    /// A facility has an empty id.
    #[error("Facility '{name}' has an empty id")]
    EmptyId {
        /// Name of the offending facility.
        name: String,
    },

    /// A facility centre is outside the valid latitude/longitude range.
    #[error("Facility {id} has out-of-range centre ({lat}, {lng})")]
    InvalidCoordinate {
        /// Facility id.
        id: String,
        /// Latitude as loaded.
        lat: f64,
        /// Longitude as loaded.
        lng: f64,
    },

    /// A facility radius is zero, negative or not finite.
    #[error("Facility {id} has non-positive radius {radius_km} km")]
    InvalidRadius {
        /// Facility id.
        id: String,
        /// Radius as loaded.
        radius_km: f64,
    },

    /// An embedded catalog file could not be parsed.
    #[error("Failed to parse facility file '{name}': {source}")]
    Parse {
        /// Registry name of the file.
        name: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Immutable, validated list of zone facilities.
///
/// Cloning is cheap: the facility list is shared.
#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    facilities: Arc<[ZoneFacility]>,
}

impl ZoneCatalog {
    /// Validates `facilities` and builds a catalog preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any id is empty or repeated, any centre
    /// is out of range, or any radius is not strictly positive.
    pub fn new(facilities: Vec<ZoneFacility>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();

        for facility in &facilities {
            if facility.id.is_empty() {
                return Err(CatalogError::EmptyId {
                    name: facility.name.clone(),
                });
            }
            if !seen.insert(facility.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: facility.id.clone(),
                });
            }
            if !facility.center.is_valid() {
                return Err(CatalogError::InvalidCoordinate {
                    id: facility.id.clone(),
                    lat: facility.center.lat,
                    lng: facility.center.lng,
                });
            }
            if !(facility.radius_km.is_finite() && facility.radius_km > 0.0) {
                return Err(CatalogError::InvalidRadius {
                    id: facility.id.clone(),
                    radius_km: facility.radius_km,
                });
            }
        }

        Ok(Self {
            facilities: facilities.into(),
        })
    }

    /// Loads and validates the compiled-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if an embedded file is malformed or the
    /// combined catalog fails validation.
    pub fn load_default() -> Result<Self, CatalogError> {
        let catalog = Self::new(registry::load_facilities()?)?;
        log::info!("Loaded {} zone facilities", catalog.len());
        Ok(catalog)
    }

    /// All facilities in catalog order.
    #[must_use]
    pub fn facilities(&self) -> &[ZoneFacility] {
        &self.facilities
    }

    /// Number of catalog facilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Looks up a facility by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ZoneFacility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    /// Facilities with the given zone color, in catalog order.
    #[must_use]
    pub fn by_zone(&self, color: ZoneColor) -> Vec<&ZoneFacility> {
        self.facilities
            .iter()
            .filter(|f| f.zone_color == color)
            .collect()
    }

    /// Facilities in the given category, in catalog order.
    #[must_use]
    pub fn by_category(&self, category: FacilityCategory) -> Vec<&ZoneFacility> {
        self.facilities
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }

    /// Returns the first facility in catalog order whose zone contains
    /// `point`.
    ///
    /// When zones overlap this is not necessarily the nearest facility.
    #[must_use]
    pub fn containing(&self, point: GeoPoint) -> Option<(&ZoneFacility, ZoneColor)> {
        first_containing(self.facilities.iter(), point).map(|f| (f, f.zone_color))
    }

    /// [`Self::containing`] in the result shape consumed by flight planning.
    #[must_use]
    pub fn check(&self, point: GeoPoint) -> ZoneCheck {
        self.containing(point)
            .map_or_else(ZoneCheck::outside, |(f, _)| ZoneCheck::inside(f.clone()))
    }

    /// All facilities whose centre is within `max_distance_km` of `point`,
    /// nearest first.
    #[must_use]
    pub fn nearby(&self, point: GeoPoint, max_distance_km: f64) -> Vec<NearbyFacility> {
        let mut found: Vec<NearbyFacility> = self
            .facilities
            .iter()
            .filter_map(|f| {
                let distance = distance_km(point, f.center);
                (distance <= max_distance_km).then(|| NearbyFacility {
                    facility: f.clone(),
                    distance_km: distance,
                })
            })
            .collect();

        found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        found
    }

    /// One generated yellow perimeter ring per red-zone facility, radius
    /// extended by [`PERIMETER_BUFFER_KM`].
    #[must_use]
    pub fn perimeter_zones(&self) -> Vec<ZoneFacility> {
        self.facilities
            .iter()
            .filter(|f| f.zone_color == ZoneColor::Red)
            .map(|red| ZoneFacility {
                id: format!("{}-perimeter", red.id),
                name: red.name.clone(),
                category: red.category,
                zone_color: ZoneColor::Yellow,
                center: red.center,
                radius_km: red.radius_km + PERIMETER_BUFFER_KM,
                metadata: red.metadata.clone(),
                perimeter_of: Some(red.id.clone()),
            })
            .collect()
    }

    /// The yellow zones as rendered: catalog yellow facilities followed by
    /// the generated red-zone perimeters.
    #[must_use]
    pub fn yellow_view(&self) -> Vec<ZoneFacility> {
        self.by_zone(ZoneColor::Yellow)
            .into_iter()
            .cloned()
            .chain(self.perimeter_zones())
            .collect()
    }

    /// Checks `point` against red zones first, then the yellow view
    /// including perimeter rings. First match wins within each pass.
    #[must_use]
    pub fn containing_in_view(&self, point: GeoPoint) -> ZoneCheck {
        if let Some(red) = first_containing(self.by_zone(ZoneColor::Red).into_iter(), point) {
            return ZoneCheck::inside(red.clone());
        }

        let yellow = self.yellow_view();
        first_containing(yellow.iter(), point)
            .map_or_else(ZoneCheck::outside, |f| ZoneCheck::inside(f.clone()))
    }

    /// Facilities whose zone any point of `path` passes through, in
    /// catalog order without repeats.
    ///
    /// The path is sampled along great circles every `step_km`.
    #[must_use]
    pub fn path_intersections(&self, path: &[GeoPoint], step_km: f64) -> Vec<&ZoneFacility> {
        let samples = sample_path(path, step_km);

        self.facilities
            .iter()
            .filter(|f| samples.iter().any(|p| in_zone(f, *p)))
            .collect()
    }
}

fn in_zone(facility: &ZoneFacility, point: GeoPoint) -> bool {
    distance_km(point, facility.center) <= facility.radius_km
}

fn first_containing<'a>(
    mut facilities: impl Iterator<Item = &'a ZoneFacility>,
    point: GeoPoint,
) -> Option<&'a ZoneFacility> {
    facilities.find(|f| in_zone(f, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_map_geodesy::{DEFAULT_CIRCLE_SEGMENTS, circle_polygon};
    use drone_map_zone_models::FacilityMetadata;

    fn default_catalog() -> ZoneCatalog {
        ZoneCatalog::load_default().unwrap()
    }

    fn facility(id: &str, color: ZoneColor, lat: f64, lng: f64, radius_km: f64) -> ZoneFacility {
        ZoneFacility {
            id: id.to_string(),
            name: id.to_string(),
            category: FacilityCategory::Government,
            zone_color: color,
            center: GeoPoint::new(lat, lng),
            radius_km,
            metadata: FacilityMetadata::default(),
            perimeter_of: None,
        }
    }

    #[test]
    fn every_facility_contains_its_own_centre() {
        let catalog = default_catalog();
        for f in catalog.facilities() {
            let (found, color) = catalog.containing(f.center).unwrap();
            assert_eq!(found.id, f.id);
            assert_eq!(color, f.zone_color);
        }
    }

    #[test]
    fn circle_vertices_lie_on_facility_radius() {
        let catalog = default_catalog();
        for f in catalog.facilities() {
            let circle = circle_polygon(f.center, f.radius_km, DEFAULT_CIRCLE_SEGMENTS);
            for coord in &circle.exterior().0 {
                let d = distance_km(f.center, GeoPoint::from(*coord));
                assert!(
                    (d - f.radius_km).abs() / f.radius_km < 0.01,
                    "{}: vertex at {d} km, radius {} km",
                    f.id,
                    f.radius_km
                );
            }
        }
    }

    #[test]
    fn open_ocean_is_outside_every_zone() {
        let catalog = default_catalog();
        assert!(catalog.containing(GeoPoint::new(30.0, 145.0)).is_none());
        assert!(!catalog.check(GeoPoint::new(30.0, 145.0)).in_zone);
    }

    #[test]
    fn imperial_palace_is_red() {
        let catalog = default_catalog();
        let (facility, color) = catalog.containing(GeoPoint::new(35.6852, 139.7528)).unwrap();
        assert_eq!(facility.name, "皇居");
        assert_eq!(color, ZoneColor::Red);

        let check = catalog.check(GeoPoint::new(35.6852, 139.7528));
        assert!(check.in_zone);
        assert_eq!(check.zone_color, Some(ZoneColor::Red));
    }

    #[test]
    fn containing_prefers_catalog_order_over_distance() {
        let catalog = ZoneCatalog::new(vec![
            facility("wide", ZoneColor::Yellow, 35.0, 139.0, 5.0),
            facility("tight", ZoneColor::Red, 35.0, 139.01, 0.5),
        ])
        .unwrap();

        // Sits on "tight"'s centre but inside "wide" too.
        let (found, color) = catalog.containing(GeoPoint::new(35.0, 139.01)).unwrap();
        assert_eq!(found.id, "wide");
        assert_eq!(color, ZoneColor::Yellow);
    }

    #[test]
    fn filters_preserve_catalog_order() {
        let catalog = default_catalog();
        let red = catalog.by_zone(ZoneColor::Red);
        let yellow = catalog.by_zone(ZoneColor::Yellow);
        assert_eq!(red.len() + yellow.len(), catalog.len());
        assert!(red.iter().all(|f| f.zone_color == ZoneColor::Red));

        let positions: Vec<usize> = red
            .iter()
            .map(|f| catalog.facilities().iter().position(|c| c.id == f.id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let nuclear = catalog.by_category(FacilityCategory::Nuclear);
        assert!(!nuclear.is_empty());
        assert!(nuclear.iter().all(|f| f.category == FacilityCategory::Nuclear));
    }

    #[test]
    fn regional_offices_are_restricted() {
        let catalog = default_catalog();
        assert_eq!(catalog.by_category(FacilityCategory::Prefecture).len(), 47);

        for id in [
            "hokkaido-prefectural-government",
            "fukuoka-prefectural-government",
            "okinawa-prefectural-government",
        ] {
            let office = catalog.get(id).unwrap();
            let check = catalog.check(office.center);
            assert!(check.in_zone, "{id} not restricted");
            assert_eq!(check.zone_color, Some(ZoneColor::Yellow));
        }
    }

    #[test]
    fn nearby_is_sorted_and_bounded() {
        let catalog = default_catalog();
        let kasumigaseki = GeoPoint::new(35.6750, 139.7500);
        let nearby = catalog.nearby(kasumigaseki, 2.0);

        assert!(nearby.len() >= 3);
        assert!(nearby.iter().all(|n| n.distance_km <= 2.0));
        assert!(nearby.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert_eq!(nearby[0].facility.id, "prime-minister-office");
    }

    #[test]
    fn perimeter_rings_wrap_every_red_facility() {
        let catalog = default_catalog();
        let perimeters = catalog.perimeter_zones();
        assert_eq!(perimeters.len(), catalog.by_zone(ZoneColor::Red).len());

        for ring in &perimeters {
            let red = catalog.get(ring.perimeter_of.as_deref().unwrap()).unwrap();
            assert_eq!(ring.zone_color, ZoneColor::Yellow);
            assert!((ring.radius_km - (red.radius_km + PERIMETER_BUFFER_KM)).abs() < 1e-12);
            assert!(ring.is_perimeter());
            assert!(catalog.get(&ring.id).is_none());
        }

        let view = catalog.yellow_view();
        assert_eq!(
            view.len(),
            catalog.by_zone(ZoneColor::Yellow).len() + perimeters.len()
        );
    }

    #[test]
    fn view_check_reports_perimeter_ring() {
        let catalog = default_catalog();
        let palace = catalog.get("imperial-palace").unwrap();
        // Just outside the red radius, inside the perimeter ring.
        let point = drone_map_geodesy::destination_point(palace.center, palace.radius_km + 0.1, 0.0);

        assert!(catalog.containing(point).is_none());
        let check = catalog.containing_in_view(point);
        assert!(check.in_zone);
        assert_eq!(check.zone_color, Some(ZoneColor::Yellow));
        assert_eq!(
            check.facility.unwrap().perimeter_of.as_deref(),
            Some("imperial-palace")
        );
    }

    #[test]
    fn path_crossing_zones_reports_each_once_in_catalog_order() {
        let catalog = default_catalog();
        let path = [GeoPoint::new(35.6731, 139.7400), GeoPoint::new(35.6731, 139.7600)];
        let hits = catalog.path_intersections(&path, 0.05);
        let ids: Vec<&str> = hits.iter().map(|f| f.id.as_str()).collect();

        assert!(ids.contains(&"prime-minister-office"), "{ids:?}");
        let unique: BTreeSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ZoneCatalog::new(vec![
            facility("dup", ZoneColor::Red, 35.0, 139.0, 1.0),
            facility("dup", ZoneColor::Red, 36.0, 139.0, 1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { id } if id == "dup"));
    }

    #[test]
    fn rejects_invalid_geometry() {
        assert!(matches!(
            ZoneCatalog::new(vec![facility("a", ZoneColor::Red, 95.0, 139.0, 1.0)]),
            Err(CatalogError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            ZoneCatalog::new(vec![facility("a", ZoneColor::Red, 35.0, 139.0, 0.0)]),
            Err(CatalogError::InvalidRadius { .. })
        ));
        assert!(matches!(
            ZoneCatalog::new(vec![facility("", ZoneColor::Red, 35.0, 139.0, 1.0)]),
            Err(CatalogError::EmptyId { .. })
        ));
    }
}
