#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Airport restriction-surface engine.
//!
//! Restriction surfaces are published as `GeoJSON` vector tiles at a
//! single zoom level. This crate maps viewports and points to tiles,
//! fetches and classifies tile contents through a bounded FIFO cache that
//! de-duplicates concurrent requests, and answers exact point-in-surface
//! queries against the cached polygons.
//!
//! Fetch failures never reach callers: an unreachable or malformed tile
//! is treated as a tile with no surfaces.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod containment;
pub mod features;
pub mod fetcher;
pub mod tiles;

mod retry;

#[cfg(test)]
pub(crate) mod testing;

use drone_map_surface_models::TileKey;
use thiserror::Error;

pub use cache::{CacheStats, SurfaceTileCache};
pub use classifier::{Classification, classify};
pub use config::SurfaceSourceConfig;
pub use containment::{ContainmentEngine, point_in_multi_polygon, point_in_polygon};
pub use features::{SurfaceFeature, TileFeatures};
pub use fetcher::{HttpTileFetcher, TileFetcher};
pub use tiles::{MAX_TILES, SURFACE_ZOOM, tile_for_point, visible_range, visible_tiles};

/// Errors that can occur while fetching or configuring surface tiles.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status that is not retried.
    #[error("HTTP status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The fetch did not complete within the configured timeout.
    #[error("Fetching tile {key} timed out")]
    Timeout {
        /// The tile being fetched.
        key: TileKey,
    },

    /// The body was JSON but not a usable `GeoJSON` `FeatureCollection`.
    #[error("Malformed tile payload: {message}")]
    Payload {
        /// Description of what went wrong.
        message: String,
    },

    /// The tile source configuration is invalid.
    #[error("Invalid surface source configuration: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
