#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the drone map server.
//!
//! Zone and surface check results are returned in their model shapes
//! (`ZoneCheck`, `SurfaceCheck`, `NearbyFacility`); the types here cover
//! query parameters and server-specific envelopes.

use drone_map_geodesy::GeoPoint;
use drone_map_zone_models::ZoneColor;
use serde::{Deserialize, Serialize};

/// Default search radius for the nearby endpoint, in kilometres.
pub const DEFAULT_NEARBY_KM: f64 = 5.0;

/// Response for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server is answering.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of catalog facilities loaded.
    pub facility_count: usize,
    /// Surface tile cache counters.
    pub surface_cache: ApiCacheStats,
}

/// Surface tile cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests that attached to an in-flight fetch.
    pub joins: u64,
    /// Fetches issued upstream.
    pub fetches: u64,
    /// Fetches that failed.
    pub failures: u64,
    /// Entries evicted.
    pub evictions: u64,
    /// Tiles currently cached.
    pub size: usize,
}

/// Query parameters for `GET /api/zones`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonesQueryParams {
    /// Only zones of this color. Both colors when absent.
    pub color: Option<ZoneColor>,
    /// Comma-separated facility categories.
    pub category: Option<String>,
    /// Polygon segments per circle.
    pub segments: Option<u32>,
}

/// Query parameters carrying a single point.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointQueryParams {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl PointQueryParams {
    /// The point as a [`GeoPoint`].
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Query parameters for `GET /api/zones/nearby`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQueryParams {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Search radius in kilometres. Defaults to [`DEFAULT_NEARBY_KM`].
    pub km: Option<f64>,
}

/// Query parameters for `GET /api/surfaces`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfacesQueryParams {
    /// Bounding box as `west,south,east,north`.
    pub bbox: String,
    /// Map zoom level. Accepted and ignored; surfaces are single-zoom.
    pub zoom: Option<u8>,
}

/// One entry of a `POST /api/surfaces/check` request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPoint {
    /// Caller-chosen identifier echoed back as the response key.
    pub id: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
