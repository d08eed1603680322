//! Bounded, de-duplicating cache of classified surface tiles.
//!
//! ```text
//! caller A ─┐
//!           ├──► resolve_tile(key) ──► cache hit? ──► Arc<TileFeatures>
//! caller B ─┘            │
//!                        ▼
//!                 in-flight entry? ──► await the shared future
//!                        │
//!                        ▼
//!                 spawn fetch task ──► classify ──► insert (FIFO evict)
//! ```
//!
//! The cache map, insertion order and in-flight map live behind one
//! mutex, so a key is either cached, in flight, or absent and never two
//! of those at once. Fetch tasks are spawned, so they run to completion
//! even if every waiter is dropped. Failures are returned as empty tiles
//! and are not cached.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use drone_map_geodesy::BoundingBox;
use drone_map_surface_models::TileKey;
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use geojson::FeatureCollection;
use serde::Serialize;

use crate::SurfaceError;
use crate::config::SurfaceSourceConfig;
use crate::features::TileFeatures;
use crate::fetcher::{TileFetcher, empty_collection};
use crate::tiles::{MAX_TILES, SURFACE_ZOOM, visible_range};

/// Default number of tiles kept in memory.
pub const DEFAULT_CAPACITY: usize = 200;

/// Default per-tile fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

type InFlight = Shared<BoxFuture<'static, Arc<TileFeatures>>>;

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests that attached to a fetch already in flight.
    pub joins: u64,
    /// Fetches issued to the tile source.
    pub fetches: u64,
    /// Fetches that failed, timed out or returned a malformed payload.
    pub failures: u64,
    /// Entries dropped to make room for newer tiles.
    pub evictions: u64,
    /// Tiles currently cached.
    pub size: usize,
}

#[derive(Default)]
struct CacheState {
    entries: BTreeMap<TileKey, Arc<TileFeatures>>,
    order: VecDeque<TileKey>,
    in_flight: BTreeMap<TileKey, InFlight>,
    stats: CacheStats,
}

impl CacheState {
    fn insert(&mut self, key: TileKey, tile: Arc<TileFeatures>, capacity: usize) {
        if self.entries.insert(key, tile).is_some() {
            return;
        }
        self.order.push_back(key);

        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
                log::debug!("Evicted surface tile {oldest}");
            }
        }
    }
}

struct Inner {
    fetcher: Arc<dyn TileFetcher>,
    state: Mutex<CacheState>,
    capacity: usize,
    max_tiles: u64,
    fetch_timeout: Duration,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle to the tile cache. Clones share the same state.
#[derive(Clone)]
pub struct SurfaceTileCache {
    inner: Arc<Inner>,
}

impl SurfaceTileCache {
    /// Creates a cache with the default capacity, fan-out cap and
    /// timeout.
    #[must_use]
    pub fn new(fetcher: Arc<dyn TileFetcher>) -> Self {
        Self::with_limits(fetcher, DEFAULT_CAPACITY, MAX_TILES, DEFAULT_FETCH_TIMEOUT)
    }

    /// Creates a cache using the limits from `config`. Each fetch may
    /// take the whole retry budget of the source before it is abandoned.
    #[must_use]
    pub fn from_config(fetcher: Arc<dyn TileFetcher>, config: &SurfaceSourceConfig) -> Self {
        Self::with_limits(
            fetcher,
            config.cache_capacity,
            config.max_tiles,
            config.fetch_budget(),
        )
    }

    /// Creates a cache with explicit limits. A zero capacity is raised
    /// to one.
    #[must_use]
    pub fn with_limits(
        fetcher: Arc<dyn TileFetcher>,
        capacity: usize,
        max_tiles: u64,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                state: Mutex::new(CacheState::default()),
                capacity: capacity.max(1),
                max_tiles,
                fetch_timeout,
            }),
        }
    }

    /// Returns the classified features of one tile.
    ///
    /// A cached tile is returned without I/O. If a fetch for `key` is
    /// already running, this waits for it instead of fetching again.
    /// Otherwise a fetch is started. Failed fetches yield an empty tile.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn resolve_tile(&self, key: TileKey) -> Arc<TileFeatures> {
        let pending = {
            let mut state = self.inner.lock();

            if let Some(tile) = state.entries.get(&key) {
                let tile = tile.clone();
                state.stats.hits += 1;
                return tile;
            }

            if let Some(pending) = state.in_flight.get(&key) {
                let pending = pending.clone();
                state.stats.joins += 1;
                log::debug!("Joining in-flight fetch for surface tile {key}");
                pending
            } else {
                state.stats.fetches += 1;
                let pending = self.spawn_fetch(key);
                state.in_flight.insert(key, pending.clone());
                pending
            }
        };

        pending.await
    }

    fn spawn_fetch(&self, key: TileKey) -> InFlight {
        let task = tokio::spawn(run_fetch(self.inner.clone(), key));
        let inner = self.inner.clone();

        async move {
            task.await.unwrap_or_else(|e| {
                log::error!("Surface tile {key} fetch task failed: {e}");
                let mut state = inner.lock();
                state.in_flight.remove(&key);
                state.stats.failures += 1;
                Arc::new(TileFeatures::empty())
            })
        }
        .boxed()
        .shared()
    }

    /// Returns every classified feature covering `bbox`.
    ///
    /// Surface tiles exist only at [`SURFACE_ZOOM`], so `_zoom` is
    /// accepted for API symmetry and ignored. If the box needs more
    /// tiles than the fan-out cap, an empty collection is returned.
    /// Tiles are fetched concurrently and concatenated in row-major
    /// order.
    pub async fn fetch_tiles(&self, bbox: &BoundingBox, _zoom: u8) -> FeatureCollection {
        let range = visible_range(bbox, SURFACE_ZOOM);
        if range.count > self.inner.max_tiles {
            log::warn!(
                "Surface query needs {} tiles (x {}..={}, y {}..={}), over the cap of {}",
                range.count,
                range.x_min,
                range.x_max,
                range.y_min,
                range.y_max,
                self.inner.max_tiles
            );
            return empty_collection();
        }

        let tiles = join_all(range.tiles().map(|key| self.resolve_tile(key))).await;

        FeatureCollection {
            bbox: None,
            features: tiles
                .iter()
                .flat_map(|tile| tile.features().iter().map(|f| f.feature.clone()))
                .collect(),
            foreign_members: None,
        }
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.inner.lock();
        CacheStats {
            size: state.entries.len(),
            ..state.stats
        }
    }

    /// Number of cached tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether no tiles are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Whether `key` is cached.
    #[must_use]
    pub fn contains(&self, key: TileKey) -> bool {
        self.inner.lock().entries.contains_key(&key)
    }

    /// Maximum number of cached tiles.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl std::fmt::Debug for SurfaceTileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTileCache")
            .field("capacity", &self.inner.capacity)
            .field("max_tiles", &self.inner.max_tiles)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

async fn run_fetch(inner: Arc<Inner>, key: TileKey) -> Arc<TileFeatures> {
    let result = match tokio::time::timeout(inner.fetch_timeout, inner.fetcher.fetch(key)).await {
        Ok(result) => result,
        Err(_) => Err(SurfaceError::Timeout { key }),
    };

    let mut state = inner.lock();
    state.in_flight.remove(&key);

    match result {
        Ok(collection) => {
            let tile = Arc::new(TileFeatures::from_collection(collection));
            log::debug!("Cached surface tile {key} ({} features)", tile.len());
            state.insert(key, tile.clone(), inner.capacity);
            tile
        }
        Err(e) => {
            log::warn!("Surface tile {key} unavailable: {e}");
            state.stats.failures += 1;
            Arc::new(TileFeatures::empty())
        }
    }
}
