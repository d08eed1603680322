#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for drone airspace restriction queries.
//!
//! Serves restricted-facility zones (GeoJSON circles, containment and
//! proximity checks) from the compiled-in catalog, and airport
//! restriction surfaces through a shared tile cache in front of the
//! upstream tile source.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use drone_map_surface::{
    ContainmentEngine, HttpTileFetcher, SurfaceSourceConfig, SurfaceTileCache, TileFetcher,
};
use drone_map_zone::ZoneCatalog;

/// Shared application state.
pub struct AppState {
    /// Restricted-facility catalog.
    pub catalog: ZoneCatalog,
    /// Surface containment engine over the shared tile cache.
    pub surfaces: ContainmentEngine,
}

impl AppState {
    /// Builds state around `fetcher` using the limits in `config`.
    #[must_use]
    pub fn new(
        catalog: ZoneCatalog,
        fetcher: Arc<dyn TileFetcher>,
        config: &SurfaceSourceConfig,
    ) -> Self {
        Self {
            catalog,
            surfaces: ContainmentEngine::new(SurfaceTileCache::from_config(fetcher, config)),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/zones", web::get().to(handlers::zones))
            .route("/zones/check", web::get().to(handlers::zone_check))
            .route("/zones/nearby", web::get().to(handlers::zones_nearby))
            .route("/surfaces", web::get().to(handlers::surfaces))
            .service(
                web::resource("/surfaces/check")
                    .route(web::get().to(handlers::surface_check))
                    .route(web::post().to(handlers::surface_check_batch)),
            ),
    );
}

/// Starts the drone map API server.
///
/// Loads the facility catalog, builds the surface tile source from the
/// embedded configuration plus environment overrides, and serves the
/// API on `BIND_ADDR:PORT` (default `127.0.0.1:8080`). The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the catalog or tile source
/// configuration is invalid, or the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let catalog = ZoneCatalog::load_default().map_err(std::io::Error::other)?;

    let config = SurfaceSourceConfig::from_env().map_err(std::io::Error::other)?;
    let fetcher = HttpTileFetcher::new(&config).map_err(std::io::Error::other)?;
    log::info!(
        "Surface tiles from '{}' ({}), cache capacity {}",
        config.name,
        config.url_template,
        config.cache_capacity
    );

    let state = web::Data::new(AppState::new(catalog, Arc::new(fetcher), &config));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
