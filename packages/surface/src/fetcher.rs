//! Tile fetch collaborator.
//!
//! [`SurfaceTileCache`](crate::SurfaceTileCache) only depends on the
//! [`TileFetcher`] trait, so tests and alternative transports can supply
//! tiles without touching the network.

use async_trait::async_trait;
use drone_map_surface_models::TileKey;
use geojson::{FeatureCollection, GeoJson};

use crate::config::SurfaceSourceConfig;
use crate::{SurfaceError, retry};

/// Fetches one raw restriction-surface tile.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    /// Returns the raw feature collection for `key`.
    ///
    /// A tile with no surfaces is an empty collection, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the tile could not be retrieved or
    /// its payload is not a `FeatureCollection`.
    async fn fetch(&self, key: TileKey) -> Result<FeatureCollection, SurfaceError>;
}

/// Fetches tiles over HTTP from an XYZ URL template.
#[derive(Debug, Clone)]
pub struct HttpTileFetcher {
    client: reqwest::Client,
    url_template: String,
    max_retries: u32,
}

impl HttpTileFetcher {
    /// Builds a fetcher for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Config`] if the configuration is invalid,
    /// or [`SurfaceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SurfaceSourceConfig) -> Result<Self, SurfaceError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("drone-map/", env!("CARGO_PKG_VERSION")))
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Expands the URL template for `key`.
    #[must_use]
    pub fn tile_url(&self, key: TileKey) -> String {
        expand_template(&self.url_template, key)
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    async fn fetch(&self, key: TileKey) -> Result<FeatureCollection, SurfaceError> {
        let url = self.tile_url(key);
        log::debug!("Fetching surface tile {key} from {url}");

        let response = match retry::send_with_retry(|| self.client.get(&url), self.max_retries).await
        {
            Ok(response) => response,
            Err(SurfaceError::Status { status: 404 }) => {
                log::debug!("Surface tile {key} does not exist upstream");
                return Ok(empty_collection());
            }
            Err(e) => return Err(e),
        };

        let body = response.text().await?;
        parse_feature_collection(&body)
    }
}

fn expand_template(template: &str, key: TileKey) -> String {
    template
        .replace("{z}", &key.z.to_string())
        .replace("{x}", &key.x.to_string())
        .replace("{y}", &key.y.to_string())
}

/// An empty feature collection.
#[must_use]
pub const fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

/// Parses a tile body, which must be a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`SurfaceError::Json`] if the body is not JSON and
/// [`SurfaceError::Payload`] if it is JSON but not a feature collection.
pub fn parse_feature_collection(body: &str) -> Result<FeatureCollection, SurfaceError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    match GeoJson::from_json_value(value) {
        Ok(GeoJson::FeatureCollection(collection)) => Ok(collection),
        Ok(GeoJson::Feature(_)) => Err(SurfaceError::Payload {
            message: "expected FeatureCollection, found Feature".to_string(),
        }),
        Ok(GeoJson::Geometry(_)) => Err(SurfaceError::Payload {
            message: "expected FeatureCollection, found Geometry".to_string(),
        }),
        Err(e) => Err(SurfaceError::Payload {
            message: e.to_string(),
        }),
    }
}
