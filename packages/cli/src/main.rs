#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for drone airspace restriction queries.
//!
//! ```text
//! drone_map_cli zones list [--color red] [--category nuclear]
//! drone_map_cli zones check --lat 35.6852 --lng 139.7528
//! drone_map_cli zones nearby --lat 35.675 --lng 139.75 [--km 5]
//! drone_map_cli zones path --point 35.68,139.70 --point 35.68,139.80 [--step-km 0.1]
//! drone_map_cli zones export [--color yellow] [--segments 64] [--legacy]
//! drone_map_cli surfaces fetch --bbox 139.5,35.5,139.9,35.8
//! drone_map_cli surfaces check --point 35.55,139.78 [--point ...]
//! drone_map_cli serve
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use drone_map_geodesy::{BoundingBox, DEFAULT_CIRCLE_SEGMENTS, GeoPoint};
use drone_map_surface::{
    ContainmentEngine, HttpTileFetcher, SURFACE_ZOOM, SurfaceSourceConfig, SurfaceTileCache,
};
use drone_map_zone::ZoneCatalog;
use drone_map_zone::export::CircleMethod;
use drone_map_zone_models::{FacilityCategory, ZoneCheck, ZoneColor};

#[derive(Parser)]
#[command(
    name = "drone_map_cli",
    about = "Query drone flight restriction zones and airport surfaces"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restricted-facility radius zones
    Zones {
        #[command(subcommand)]
        command: ZoneCommands,
    },
    /// Airport restriction surfaces
    Surfaces {
        #[command(subcommand)]
        command: SurfaceCommands,
    },
    /// Start the HTTP API server (honours `BIND_ADDR` and `PORT`)
    Serve,
}

#[derive(Subcommand)]
enum ZoneCommands {
    /// List catalog facilities
    List {
        /// Only facilities of this zone color (red, yellow)
        #[arg(long)]
        color: Option<ZoneColor>,
        /// Only facilities in this category
        #[arg(long)]
        category: Option<FacilityCategory>,
    },
    /// Check whether a point is inside a zone
    Check {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Use raw catalog order instead of red-first with perimeter rings
        #[arg(long)]
        catalog_order: bool,
    },
    /// List facilities within a radius, nearest first
    Nearby {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in kilometres
        #[arg(long, default_value = "5")]
        km: f64,
    },
    /// List every zone a polyline passes through
    Path {
        /// Path vertex as `lat,lng` (repeat, in order)
        #[arg(long = "point", value_parser = parse_point, required = true)]
        points: Vec<GeoPoint>,
        /// Sampling interval along the path in kilometres
        #[arg(long, default_value = "0.1")]
        step_km: f64,
    },
    /// Print zone circles as GeoJSON
    Export {
        /// Zone color to export
        #[arg(long, default_value = "red")]
        color: ZoneColor,
        /// Polygon segments per circle
        #[arg(long, default_value_t = DEFAULT_CIRCLE_SEGMENTS)]
        segments: u32,
        /// Use the planar degree-offset circle approximation
        #[arg(long)]
        legacy: bool,
    },
}

#[derive(Subcommand)]
enum SurfaceCommands {
    /// Fetch classified surfaces for a bounding box and print GeoJSON
    Fetch {
        /// Bounding box as `west,south,east,north`
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
    },
    /// Check points against restriction surfaces
    Check {
        /// Point as `lat,lng` (repeat for a batch)
        #[arg(long = "point", value_parser = parse_point, required = true, allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
    },
}

/// Parses `"lat,lng"` into a validated point.
fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lng, got '{s}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{lng}'"))?;

    let point = GeoPoint::new(lat, lng);
    if point.is_valid() {
        Ok(point)
    } else {
        Err(format!("coordinate out of range: {s}"))
    }
}

fn print_zone_check(check: &ZoneCheck) {
    match (&check.facility, check.zone_color) {
        (Some(facility), Some(color)) => {
            println!("IN {color} ZONE: {} ({})", facility.name, facility.id);
            if let Some(red_id) = &facility.perimeter_of {
                println!("  perimeter of {red_id}");
            }
        }
        _ => println!("Not inside any zone."),
    }
}

fn surface_engine() -> Result<ContainmentEngine, Box<dyn std::error::Error>> {
    let config = SurfaceSourceConfig::from_env()?;
    let fetcher = HttpTileFetcher::new(&config)?;
    log::debug!("Surface tiles from {}", config.url_template);
    Ok(ContainmentEngine::new(SurfaceTileCache::from_config(
        Arc::new(fetcher),
        &config,
    )))
}

fn run_zones(command: ZoneCommands) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ZoneCatalog::load_default()?;

    match command {
        ZoneCommands::List { color, category } => {
            let facilities: Vec<_> = catalog
                .facilities()
                .iter()
                .filter(|f| color.is_none_or(|c| f.zone_color == c))
                .filter(|f| category.is_none_or(|c| f.category == c))
                .collect();

            println!(
                "{:<28} {:<8} {:<16} {:>8}  NAME",
                "ID", "COLOR", "CATEGORY", "RADIUS"
            );
            println!("{}", "-".repeat(90));
            for f in &facilities {
                println!(
                    "{:<28} {:<8} {:<16} {:>6.2}km  {}",
                    f.id, f.zone_color, f.category, f.radius_km, f.name
                );
            }
            println!("\n{} facilit(ies)", facilities.len());
        }
        ZoneCommands::Check {
            lat,
            lng,
            catalog_order,
        } => {
            let point = GeoPoint::new(lat, lng);
            if !point.is_valid() {
                return Err(format!("coordinate out of range: {lat},{lng}").into());
            }
            let check = if catalog_order {
                catalog.check(point)
            } else {
                catalog.containing_in_view(point)
            };
            print_zone_check(&check);
        }
        ZoneCommands::Nearby { lat, lng, km } => {
            let point = GeoPoint::new(lat, lng);
            if !point.is_valid() {
                return Err(format!("coordinate out of range: {lat},{lng}").into());
            }
            if !(km.is_finite() && km >= 0.0) {
                return Err(format!("invalid search radius {km}").into());
            }
            let nearby = catalog.nearby(point, km);
            if nearby.is_empty() {
                println!("No facilities within {km} km.");
            }
            for entry in &nearby {
                println!(
                    "{:>7.2} km  {:<6} {} ({})",
                    entry.distance_km, entry.facility.zone_color, entry.facility.name, entry.facility.id
                );
            }
        }
        ZoneCommands::Path { points, step_km } => {
            let hits = catalog.path_intersections(&points, step_km);
            if hits.is_empty() {
                println!("Path does not cross any zone.");
            }
            for f in hits {
                println!("{:<6} {} ({})", f.zone_color, f.name, f.id);
            }
        }
        ZoneCommands::Export {
            color,
            segments,
            legacy,
        } => {
            let method = if legacy {
                CircleMethod::LegacyPlanar
            } else {
                CircleMethod::Geodesic
            };
            let collection = catalog.to_feature_collection(color, segments, method);
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
    }

    Ok(())
}

async fn run_surfaces(command: SurfaceCommands) -> Result<(), Box<dyn std::error::Error>> {
    let engine = surface_engine()?;

    match command {
        SurfaceCommands::Fetch { bbox } => {
            let collection = engine.cache().fetch_tiles(&bbox, SURFACE_ZOOM).await;
            eprintln!("{} surface feature(s)", collection.features.len());
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
        SurfaceCommands::Check { points } => {
            let indexed: Vec<(usize, GeoPoint)> = points.into_iter().enumerate().collect();
            let results = engine.check_points_batch(&indexed).await;
            for (i, point) in &indexed {
                let Some(check) = results.get(i) else {
                    continue;
                };
                match (&check.kind, &check.label) {
                    (Some(kind), Some(label)) => {
                        println!("{:.5},{:.5}  IN {label} ({kind})", point.lat, point.lng);
                    }
                    _ => println!("{:.5},{:.5}  clear", point.lat, point.lng),
                }
            }
            let stats = engine.cache().stats();
            log::info!("{} tile fetch(es), {} failure(s)", stats.fetches, stats.failures);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Zones { command } => {
            pretty_env_logger::init();
            run_zones(command)?;
        }
        Commands::Surfaces { command } => {
            pretty_env_logger::init();
            run_surfaces(command).await?;
        }
        Commands::Serve => {
            // The server initialises its own logger and uses actix-web's
            // runtime, so run it on a blocking thread to avoid nesting
            // tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(drone_map_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_points() {
        let point = parse_point("35.6852, 139.7528").unwrap();
        assert!((point.lat - 35.6852).abs() < 1e-12);
        assert!((point.lng - 139.7528).abs() < 1e-12);

        assert!(parse_point("-33.9,151.2").is_ok());
        assert!(parse_point("35.6").is_err());
        assert!(parse_point("abc,139.0").is_err());
        assert!(parse_point("95.0,139.0").is_err());
    }

    #[test]
    fn nearby_rejects_invalid_input() {
        let nearby = |lat, lng, km| run_zones(ZoneCommands::Nearby { lat, lng, km });

        assert!(nearby(95.0, 139.0, 5.0).is_err());
        assert!(nearby(35.0, f64::NAN, 5.0).is_err());
        assert!(nearby(35.675, 139.75, f64::INFINITY).is_err());
        assert!(nearby(35.675, 139.75, -1.0).is_err());
        assert!(nearby(35.675, 139.75, 1.0).is_ok());
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "drone_map_cli",
            "zones",
            "path",
            "--point",
            "35.68,139.70",
            "--point",
            "35.68,139.80",
            "--step-km",
            "0.05",
        ])
        .unwrap();
        let Commands::Zones {
            command: ZoneCommands::Path { points, step_km },
        } = cli.command
        else {
            panic!("expected zones path");
        };
        assert_eq!(points.len(), 2);
        assert!((step_km - 0.05).abs() < 1e-12);

        let cli = Cli::try_parse_from([
            "drone_map_cli",
            "surfaces",
            "fetch",
            "--bbox",
            "139.5,35.5,139.9,35.8",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Surfaces {
                command: SurfaceCommands::Fetch { .. }
            }
        ));
    }
}
