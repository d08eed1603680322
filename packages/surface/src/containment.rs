//! Exact point-in-surface checks.
//!
//! Polygon tests use even-odd ray casting: a point is inside a polygon
//! when it is inside the exterior ring and outside every hole.

use std::collections::BTreeMap;

use drone_map_geodesy::GeoPoint;
use drone_map_surface_models::{SurfaceCheck, TileKey};
use futures::future::join_all;
use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::cache::SurfaceTileCache;
use crate::features::{SurfaceFeature, TileFeatures};
use crate::tiles::{SURFACE_ZOOM, tile_for_point};

/// Even-odd ray cast of `point` against one closed or open ring.
#[must_use]
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    let Some(mut previous) = coords.last() else {
        return false;
    };

    let mut inside = false;
    for current in coords {
        if (current.y > point.y) != (previous.y > point.y) {
            let crossing_x =
                (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y)
                    + current.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Whether `point` lies inside `polygon`, honouring holes.
#[must_use]
pub fn point_in_polygon(point: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    point_in_ring(point, polygon.exterior())
        && !polygon
            .interiors()
            .iter()
            .any(|hole| point_in_ring(point, hole))
}

/// Whether `point` lies inside any member of `multi_polygon`.
#[must_use]
pub fn point_in_multi_polygon(point: Coord<f64>, multi_polygon: &MultiPolygon<f64>) -> bool {
    multi_polygon
        .0
        .iter()
        .any(|polygon| point_in_polygon(point, polygon))
}

fn check_against(tile: &TileFeatures, point: GeoPoint) -> SurfaceCheck {
    tile.first_containing(point)
        .map_or_else(SurfaceCheck::outside, |feature: &SurfaceFeature| {
            SurfaceCheck::inside(feature.kind, feature.label.clone())
        })
}

/// Answers point and path queries against restriction surfaces.
#[derive(Debug, Clone)]
pub struct ContainmentEngine {
    cache: SurfaceTileCache,
}

impl ContainmentEngine {
    /// Creates an engine backed by `cache`.
    #[must_use]
    pub const fn new(cache: SurfaceTileCache) -> Self {
        Self { cache }
    }

    /// The underlying tile cache.
    #[must_use]
    pub const fn cache(&self) -> &SurfaceTileCache {
        &self.cache
    }

    /// Checks one point against the tile covering it.
    ///
    /// Never fails: an unavailable tile yields a negative result.
    pub async fn check_point(&self, point: GeoPoint) -> SurfaceCheck {
        let tile = self
            .cache
            .resolve_tile(tile_for_point(point, SURFACE_ZOOM))
            .await;
        check_against(&tile, point)
    }

    /// Checks many points, fetching each distinct covering tile once.
    ///
    /// Later entries with a duplicate id overwrite earlier ones.
    pub async fn check_points_batch<I>(&self, points: &[(I, GeoPoint)]) -> BTreeMap<I, SurfaceCheck>
    where
        I: Ord + Clone,
    {
        let tiles = self.resolve_covering(points.iter().map(|(_, p)| *p)).await;

        points
            .iter()
            .map(|(id, point)| {
                let key = tile_for_point(*point, SURFACE_ZOOM);
                let check = tiles
                    .get(&key)
                    .map_or_else(SurfaceCheck::outside, |tile| check_against(tile, *point));
                (id.clone(), check)
            })
            .collect()
    }

    /// Checks a sequence of points (typically a sampled flight path) and
    /// returns the index and result of the first one inside a surface.
    pub async fn check_path(&self, path: &[GeoPoint]) -> Option<(usize, SurfaceCheck)> {
        let tiles = self.resolve_covering(path.iter().copied()).await;

        path.iter().enumerate().find_map(|(i, point)| {
            let tile = tiles.get(&tile_for_point(*point, SURFACE_ZOOM))?;
            let check = check_against(tile, *point);
            check.in_surface.then_some((i, check))
        })
    }

    async fn resolve_covering(
        &self,
        points: impl Iterator<Item = GeoPoint>,
    ) -> BTreeMap<TileKey, std::sync::Arc<TileFeatures>> {
        let keys: Vec<TileKey> = points
            .map(|point| tile_for_point(point, SURFACE_ZOOM))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        let resolved = join_all(keys.iter().map(|key| self.cache.resolve_tile(*key))).await;
        keys.into_iter().zip(resolved).collect()
    }
}
