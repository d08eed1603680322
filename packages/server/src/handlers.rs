//! HTTP handler functions for the drone map API.

use actix_web::{HttpResponse, web};
use drone_map_geodesy::{BoundingBox, DEFAULT_CIRCLE_SEGMENTS, GeoPoint};
use drone_map_server_models::{
    ApiCacheStats, ApiError, ApiHealth, BatchPoint, DEFAULT_NEARBY_KM, NearbyQueryParams,
    PointQueryParams, SurfacesQueryParams, ZonesQueryParams,
};
use drone_map_surface::{CacheStats, SURFACE_ZOOM};
use drone_map_zone::export::{CircleMethod, feature_collection};
use drone_map_zone_models::{FacilityCategory, ZoneColor, ZoneFacility};

use crate::AppState;

/// Upper bound on polygon segments per circle.
const MAX_SEGMENTS: u32 = 256;

/// Upper bound on points in one batch request.
const MAX_BATCH_POINTS: usize = 10_000;

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(message))
}

fn invalid_point(point: GeoPoint) -> HttpResponse {
    bad_request(format!(
        "Invalid coordinate lat={} lng={}",
        point.lat, point.lng
    ))
}

const fn api_stats(stats: CacheStats) -> ApiCacheStats {
    ApiCacheStats {
        hits: stats.hits,
        joins: stats.joins,
        fetches: stats.fetches,
        failures: stats.failures,
        evictions: stats.evictions,
        size: stats.size,
    }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        facility_count: state.catalog.len(),
        surface_cache: api_stats(state.surfaces.cache().stats()),
    })
}

/// `GET /api/zones`
///
/// Returns zone circles as a `GeoJSON` `FeatureCollection`. Yellow zones
/// include the perimeter rings generated around red facilities.
pub async fn zones(
    state: web::Data<AppState>,
    params: web::Query<ZonesQueryParams>,
) -> HttpResponse {
    let categories: Vec<FacilityCategory> = match params.category.as_deref() {
        None => Vec::new(),
        Some(s) => match s
            .split(',')
            .map(|c| c.trim().parse::<FacilityCategory>())
            .collect::<Result<_, _>>()
        {
            Ok(categories) => categories,
            Err(_) => return bad_request(format!("Unknown facility category in '{s}'")),
        },
    };

    let red = || -> Vec<ZoneFacility> {
        state
            .catalog
            .by_zone(ZoneColor::Red)
            .into_iter()
            .cloned()
            .collect()
    };
    let mut facilities = match params.color {
        Some(ZoneColor::Red) => red(),
        Some(ZoneColor::Yellow) => state.catalog.yellow_view(),
        None => {
            let mut all = red();
            all.extend(state.catalog.yellow_view());
            all
        }
    };
    if !categories.is_empty() {
        facilities.retain(|f| categories.contains(&f.category));
    }

    let segments = params
        .segments
        .unwrap_or(DEFAULT_CIRCLE_SEGMENTS)
        .min(MAX_SEGMENTS);

    HttpResponse::Ok().json(feature_collection(
        &facilities,
        segments,
        CircleMethod::Geodesic,
    ))
}

/// `GET /api/zones/check`
///
/// Red zones take precedence over yellow zones and perimeter rings.
pub async fn zone_check(
    state: web::Data<AppState>,
    params: web::Query<PointQueryParams>,
) -> HttpResponse {
    let point = params.point();
    if !point.is_valid() {
        return invalid_point(point);
    }
    HttpResponse::Ok().json(state.catalog.containing_in_view(point))
}

/// `GET /api/zones/nearby`
pub async fn zones_nearby(
    state: web::Data<AppState>,
    params: web::Query<NearbyQueryParams>,
) -> HttpResponse {
    let point = GeoPoint::new(params.lat, params.lng);
    if !point.is_valid() {
        return invalid_point(point);
    }
    let km = params.km.unwrap_or(DEFAULT_NEARBY_KM);
    if !(km.is_finite() && km >= 0.0) {
        return bad_request(format!("Invalid search radius {km}"));
    }
    HttpResponse::Ok().json(state.catalog.nearby(point, km))
}

/// `GET /api/surfaces`
///
/// Returns classified restriction surfaces covering `bbox`. An empty
/// collection means either no surfaces or a viewport too large to
/// query.
pub async fn surfaces(
    state: web::Data<AppState>,
    params: web::Query<SurfacesQueryParams>,
) -> HttpResponse {
    let bbox: BoundingBox = match params.bbox.parse() {
        Ok(bbox) => bbox,
        Err(e) => return bad_request(format!("Invalid bbox '{}': {e}", params.bbox)),
    };
    let collection = state
        .surfaces
        .cache()
        .fetch_tiles(&bbox, params.zoom.unwrap_or(SURFACE_ZOOM))
        .await;
    HttpResponse::Ok().json(collection)
}

/// `GET /api/surfaces/check`
pub async fn surface_check(
    state: web::Data<AppState>,
    params: web::Query<PointQueryParams>,
) -> HttpResponse {
    let point = params.point();
    if !point.is_valid() {
        return invalid_point(point);
    }
    HttpResponse::Ok().json(state.surfaces.check_point(point).await)
}

/// `POST /api/surfaces/check`
///
/// Checks many points at once; each distinct tile is fetched once.
/// Returns a map from point id to result.
pub async fn surface_check_batch(
    state: web::Data<AppState>,
    body: web::Json<Vec<BatchPoint>>,
) -> HttpResponse {
    if body.len() > MAX_BATCH_POINTS {
        return bad_request(format!(
            "Batch of {} points exceeds the limit of {MAX_BATCH_POINTS}",
            body.len()
        ));
    }

    let mut points = Vec::with_capacity(body.len());
    for entry in body.into_inner() {
        let point = GeoPoint::new(entry.lat, entry.lng);
        if !point.is_valid() {
            return bad_request(format!("Invalid coordinate for point '{}'", entry.id));
        }
        points.push((entry.id, point));
    }

    HttpResponse::Ok().json(state.surfaces.check_points_batch(&points).await)
}
