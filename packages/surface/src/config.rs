//! Restriction-surface tile source configuration.
//!
//! The default source is compiled in from `sources/kokuarea.toml`. The
//! URL template and fetch timeout can be overridden from the environment
//! (`SURFACE_TILE_URL`, `SURFACE_FETCH_TIMEOUT_SECS`); the zoom level
//! cannot, since the published tiles exist only at [`SURFACE_ZOOM`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SurfaceError;
use crate::retry;
use crate::tiles::{MAX_TILES, SURFACE_ZOOM};

const DEFAULT_SOURCE_TOML: &str = include_str!("../sources/kokuarea.toml");

/// Environment variable overriding [`SurfaceSourceConfig::url_template`].
pub const URL_ENV: &str = "SURFACE_TILE_URL";

/// Environment variable overriding [`SurfaceSourceConfig::fetch_timeout_secs`].
pub const TIMEOUT_ENV: &str = "SURFACE_FETCH_TIMEOUT_SECS";

/// Where and how restriction-surface tiles are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSourceConfig {
    /// Unique identifier, e.g. `"gsi-kokuarea"`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    /// Zoom level the tiles are published at.
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Largest number of tiles one viewport query may request.
    #[serde(default = "default_max_tiles")]
    pub max_tiles: u64,
    /// Number of tiles kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Timeout for one HTTP attempt, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Retries for transient HTTP failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_zoom() -> u8 {
    SURFACE_ZOOM
}

const fn default_max_tiles() -> u64 {
    MAX_TILES
}

const fn default_cache_capacity() -> usize {
    200
}

const fn default_fetch_timeout_secs() -> u64 {
    15
}

const fn default_max_retries() -> u32 {
    2
}

impl SurfaceSourceConfig {
    /// Parses and validates a source definition.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Config`] if the TOML is malformed, the zoom
    /// is not [`SURFACE_ZOOM`], or any limit is zero.
    pub fn from_toml(toml_str: &str) -> Result<Self, SurfaceError> {
        let config: Self = toml::de::from_str(toml_str).map_err(|e| SurfaceError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The compiled-in source definition.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is invalid. It is a compile-time
    /// constant, so this indicates a development error.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_SOURCE_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse sources/kokuarea.toml: {e}"))
    }

    /// The compiled-in source with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Config`] if an override is invalid.
    pub fn from_env() -> Result<Self, SurfaceError> {
        Self::embedded().with_overrides(
            std::env::var(URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    /// Applies optional URL template and timeout overrides, then
    /// re-validates.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Config`] if the timeout is not a positive
    /// integer or the template lacks a placeholder.
    pub fn with_overrides(
        mut self,
        url_template: Option<String>,
        fetch_timeout_secs: Option<String>,
    ) -> Result<Self, SurfaceError> {
        if let Some(url) = url_template {
            log::info!("Using surface tile URL override: {url}");
            self.url_template = url;
        }
        if let Some(secs) = fetch_timeout_secs {
            self.fetch_timeout_secs = secs.trim().parse().map_err(|_| SurfaceError::Config {
                message: format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{secs}'"),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        let fail = |message: String| Err(SurfaceError::Config { message });

        if self.zoom != SURFACE_ZOOM {
            return fail(format!(
                "source '{}' declares zoom {}, but surface tiles exist only at zoom {SURFACE_ZOOM}",
                self.id, self.zoom
            ));
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return fail(format!(
                    "url_template '{}' is missing {placeholder}",
                    self.url_template
                ));
            }
        }
        if self.max_tiles == 0 {
            return fail("max_tiles must be positive".to_string());
        }
        if self.cache_capacity == 0 {
            return fail("cache_capacity must be positive".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return fail("fetch_timeout_secs must be positive".to_string());
        }
        Ok(())
    }

    /// [`Self::fetch_timeout_secs`] as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Upper bound on one tile fetch including retries: every attempt may
    /// run to [`Self::fetch_timeout`], plus the backoff between attempts.
    #[must_use]
    pub fn fetch_budget(&self) -> Duration {
        self.fetch_timeout()
            .checked_mul(self.max_retries.saturating_add(1))
            .and_then(|d| d.checked_add(retry::total_backoff(self.max_retries)))
            .unwrap_or(Duration::MAX)
    }
}
