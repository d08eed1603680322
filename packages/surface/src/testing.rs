//! Test doubles shared by the cache and containment tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use drone_map_surface_models::TileKey;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, PolygonType, Value};
use serde_json::json;
use tokio::sync::Notify;

use crate::SurfaceError;
use crate::fetcher::{TileFetcher, empty_collection};

/// Closed axis-aligned rectangle as `GeoJSON` polygon rings.
pub fn square(west: f64, south: f64, east: f64, north: f64) -> PolygonType {
    vec![vec![
        vec![west, south],
        vec![east, south],
        vec![east, north],
        vec![west, north],
        vec![west, south],
    ]]
}

/// A named feature with one polygon, or a multipolygon for several.
pub fn polygon_feature(name: &str, mut polygons: Vec<PolygonType>) -> Feature {
    let value = if polygons.len() == 1 {
        Value::Polygon(polygons.remove(0))
    } else {
        Value::MultiPolygon(polygons)
    };
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(name));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Counts fetches and serves canned tiles. Optionally holds every fetch
/// until [`Notify::notify_one`] is called on the gate.
#[derive(Default)]
pub struct MockFetcher {
    calls: AtomicUsize,
    per_key: std::sync::Mutex<BTreeMap<TileKey, usize>>,
    tiles: BTreeMap<TileKey, FeatureCollection>,
    failing: BTreeSet<TileKey>,
    gate: Option<Arc<Notify>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile(mut self, key: TileKey, features: Vec<Feature>) -> Self {
        self.tiles.insert(
            key,
            FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
        );
        self
    }

    pub fn failing(mut self, key: TileKey) -> Self {
        self.failing.insert(key);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, key: TileKey) -> usize {
        self.per_key
            .lock()
            .unwrap()
            .get(&key)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TileFetcher for MockFetcher {
    async fn fetch(&self, key: TileKey) -> Result<FeatureCollection, SurfaceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.per_key.lock().unwrap().entry(key).or_default() += 1;

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing.contains(&key) {
            return Err(SurfaceError::Payload {
                message: format!("mock failure for {key}"),
            });
        }
        Ok(self.tiles.get(&key).cloned().unwrap_or_else(empty_collection))
    }
}
