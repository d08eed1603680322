//! Web-Mercator tile addressing.
//!
//! Uses the standard XYZ scheme: `x` grows eastward from the
//! antimeridian and `y` grows southward from the northern Mercator
//! limit, so the north edge of a bounding box maps to the smallest row.

use std::f64::consts::PI;

use drone_map_geodesy::{BoundingBox, GeoPoint};
use drone_map_surface_models::{TileKey, TileRange};

/// The only zoom level the restriction-surface tiles are published at.
pub const SURFACE_ZOOM: u8 = 8;

/// Largest number of tiles a single viewport query may fan out to.
pub const MAX_TILES: u64 = 64;

fn tiles_per_axis(z: u8) -> f64 {
    f64::from(z).exp2()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(value: f64, z: u8) -> u32 {
    let max = tiles_per_axis(z) - 1.0;
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, max) as u32
}

/// Tile column containing longitude `lng` at zoom `z`.
#[must_use]
pub fn lng_to_tile_x(lng: f64, z: u8) -> u32 {
    clamp_index((lng + 180.0) / 360.0 * tiles_per_axis(z), z)
}

/// Tile row containing latitude `lat` at zoom `z`.
///
/// Latitudes beyond the Mercator limit (about ±85.05°) clamp to the
/// first or last row.
#[must_use]
pub fn lat_to_tile_y(lat: f64, z: u8) -> u32 {
    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * tiles_per_axis(z);
    clamp_index(y, z)
}

/// Tile containing `point` at zoom `z`.
#[must_use]
pub fn tile_for_point(point: GeoPoint, z: u8) -> TileKey {
    TileKey::new(z, lng_to_tile_x(point.lng, z), lat_to_tile_y(point.lat, z))
}

/// Range of tiles covering `bbox` at zoom `z`.
#[must_use]
pub fn visible_range(bbox: &BoundingBox, z: u8) -> TileRange {
    TileRange::new(
        z,
        lng_to_tile_x(bbox.west, z),
        lng_to_tile_x(bbox.east, z),
        lat_to_tile_y(bbox.north, z),
        lat_to_tile_y(bbox.south, z),
    )
}

/// Every tile covering `bbox` at zoom `z`, row-major from the north-west
/// corner.
#[must_use]
pub fn visible_tiles(bbox: &BoundingBox, z: u8) -> Vec<TileKey> {
    visible_range(bbox, z).tiles().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokyo_station_tile() {
        let key = tile_for_point(GeoPoint::new(35.6812, 139.7671), SURFACE_ZOOM);
        assert_eq!(key, TileKey::new(8, 227, 100));
    }

    #[test]
    fn zoom_zero_is_a_single_tile() {
        assert_eq!(lng_to_tile_x(-179.9, 0), 0);
        assert_eq!(lng_to_tile_x(179.9, 0), 0);
        assert_eq!(lat_to_tile_y(80.0, 0), 0);
        assert_eq!(lat_to_tile_y(-80.0, 0), 0);
    }

    #[test]
    fn quadrants_at_zoom_one() {
        assert_eq!(lng_to_tile_x(-90.0, 1), 0);
        assert_eq!(lng_to_tile_x(90.0, 1), 1);
        assert_eq!(lat_to_tile_y(45.0, 1), 0);
        assert_eq!(lat_to_tile_y(-45.0, 1), 1);
    }

    #[test]
    fn extremes_clamp_into_grid() {
        let last = (1u32 << SURFACE_ZOOM) - 1;
        assert_eq!(lng_to_tile_x(180.0, SURFACE_ZOOM), last);
        assert_eq!(lng_to_tile_x(-180.0, SURFACE_ZOOM), 0);
        assert_eq!(lat_to_tile_y(90.0, SURFACE_ZOOM), 0);
        assert_eq!(lat_to_tile_y(-90.0, SURFACE_ZOOM), last);
        assert_eq!(lat_to_tile_y(f64::NAN, SURFACE_ZOOM), 0);
    }

    #[test]
    fn north_maps_to_smaller_row() {
        assert!(lat_to_tile_y(44.0, SURFACE_ZOOM) < lat_to_tile_y(26.0, SURFACE_ZOOM));
    }

    #[test]
    fn box_inside_one_tile_has_count_one() {
        let bbox = BoundingBox::new(139.5, 35.5, 139.9, 35.8);
        let range = visible_range(&bbox, SURFACE_ZOOM);
        assert_eq!(range.count, 1);
        assert_eq!(visible_tiles(&bbox, SURFACE_ZOOM), vec![TileKey::new(8, 227, 100)]);
    }

    #[test]
    fn whole_country_exceeds_fan_out_cap() {
        let japan = BoundingBox::new(122.0, 24.0, 154.0, 46.0);
        let range = visible_range(&japan, SURFACE_ZOOM);
        assert!(range.count > MAX_TILES, "count was {}", range.count);
        assert_eq!(visible_tiles(&japan, SURFACE_ZOOM).len() as u64, range.count);
    }

    #[test]
    fn visible_tiles_start_north_west() {
        let bbox = BoundingBox::new(139.0, 35.0, 141.0, 36.5);
        let tiles = visible_tiles(&bbox, SURFACE_ZOOM);
        let range = visible_range(&bbox, SURFACE_ZOOM);
        assert_eq!(
            tiles.first(),
            Some(&TileKey::new(8, range.x_min, range.y_min))
        );
        assert_eq!(
            tiles.last(),
            Some(&TileKey::new(8, range.x_max, range.y_max))
        );
    }
}
