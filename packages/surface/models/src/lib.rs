#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Restriction-surface tile and classification types.
//!
//! Airport restriction surfaces (approach, transitional, horizontal, ...)
//! are published as `GeoJSON` tiles addressed by Web-Mercator `z/x/y`
//! keys. These types describe the tile addressing and the classification
//! injected into each feature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Address of a Web-Mercator XYZ tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    /// Zoom level.
    pub z: u8,
    /// Column, increasing eastward.
    pub x: u32,
    /// Row, increasing southward.
    pub y: u32,
}

impl TileKey {
    /// Creates a new tile key.
    #[must_use]
    pub const fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Error returned when a `"z/x/y"` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tile key '{0}': expected z/x/y")]
pub struct InvalidTileKeyError(pub String);

impl FromStr for TileKey {
    type Err = InvalidTileKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTileKeyError(s.to_string());
        let mut parts = s.split('/');
        let (Some(z), Some(x), Some(y), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        Ok(Self {
            z: z.parse().map_err(|_| invalid())?,
            x: x.parse().map_err(|_| invalid())?,
            y: y.parse().map_err(|_| invalid())?,
        })
    }
}

/// Inclusive rectangle of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRange {
    /// Zoom level.
    pub z: u8,
    /// Westernmost column.
    pub x_min: u32,
    /// Easternmost column.
    pub x_max: u32,
    /// Northernmost row.
    pub y_min: u32,
    /// Southernmost row.
    pub y_max: u32,
    /// Number of tiles, `(x_max - x_min + 1) * (y_max - y_min + 1)`.
    pub count: u64,
}

impl TileRange {
    /// Builds a range, computing `count`. Bounds are swapped if given in
    /// the wrong order.
    #[must_use]
    pub fn new(z: u8, x_a: u32, x_b: u32, y_a: u32, y_b: u32) -> Self {
        let (x_min, x_max) = (x_a.min(x_b), x_a.max(x_b));
        let (y_min, y_max) = (y_a.min(y_b), y_a.max(y_b));
        let count = (u64::from(x_max - x_min) + 1) * (u64::from(y_max - y_min) + 1);
        Self {
            z,
            x_min,
            x_max,
            y_min,
            y_max,
            count,
        }
    }

    /// Every tile in the range, row by row from north to south, west to
    /// east within a row.
    pub fn tiles(&self) -> impl Iterator<Item = TileKey> + '_ {
        (self.y_min..=self.y_max)
            .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TileKey::new(self.z, x, y)))
    }

    /// Whether `key` falls inside this range.
    #[must_use]
    pub const fn contains(&self, key: TileKey) -> bool {
        key.z == self.z
            && key.x >= self.x_min
            && key.x <= self.x_max
            && key.y >= self.y_min
            && key.y <= self.y_max
    }
}

/// Kind of airport restriction surface.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurfaceKind {
    /// 進入表面
    Approach,
    /// 転移表面
    Transitional,
    /// 水平表面
    Horizontal,
    /// 円錐表面
    Conical,
    /// 外側水平表面
    OuterHorizontal,
    /// 延長進入表面
    ExtendedApproach,
    /// Anything the classifier could not place.
    Other,
}

impl SurfaceKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Approach,
            Self::Transitional,
            Self::Horizontal,
            Self::Conical,
            Self::OuterHorizontal,
            Self::ExtendedApproach,
            Self::Other,
        ]
    }

    /// Japanese label as printed on official surface maps.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approach => "進入表面",
            Self::Transitional => "転移表面",
            Self::Horizontal => "水平表面",
            Self::Conical => "円錐表面",
            Self::OuterHorizontal => "外側水平表面",
            Self::ExtendedApproach => "延長進入表面",
            Self::Other => "その他の制限表面",
        }
    }

    /// Fixed rendering style for this kind.
    #[must_use]
    pub const fn style(self) -> SurfaceStyle {
        match self {
            Self::Approach => SurfaceStyle::new("#f97316", "#c2410c", 0.25, 0.9, 1.5),
            Self::Transitional => SurfaceStyle::new("#eab308", "#a16207", 0.2, 0.8, 1.0),
            Self::Horizontal => SurfaceStyle::new("#22c55e", "#15803d", 0.15, 0.8, 1.0),
            Self::Conical => SurfaceStyle::new("#3b82f6", "#1d4ed8", 0.15, 0.8, 1.0),
            Self::OuterHorizontal => SurfaceStyle::new("#8b5cf6", "#6d28d9", 0.1, 0.7, 1.0),
            Self::ExtendedApproach => SurfaceStyle::new("#ef4444", "#b91c1c", 0.2, 0.9, 1.5),
            Self::Other => SurfaceStyle::new("#6b7280", "#374151", 0.1, 0.6, 0.5),
        }
    }
}

/// Paint properties for one surface kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStyle {
    /// Polygon fill color (`#rrggbb`).
    pub fill_color: &'static str,
    /// Outline color (`#rrggbb`).
    pub line_color: &'static str,
    /// Fill opacity, `0..=1`.
    pub fill_opacity: f64,
    /// Outline opacity, `0..=1`.
    pub line_opacity: f64,
    /// Outline width in pixels.
    pub line_width: f64,
}

impl SurfaceStyle {
    const fn new(
        fill_color: &'static str,
        line_color: &'static str,
        fill_opacity: f64,
        line_opacity: f64,
        line_width: f64,
    ) -> Self {
        Self {
            fill_color,
            line_color,
            fill_opacity,
            line_opacity,
            line_width,
        }
    }
}

/// Result of an exact surface containment check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceCheck {
    /// Whether the point lies inside any restriction surface.
    pub in_surface: bool,
    /// Kind of the first matching surface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SurfaceKind>,
    /// Human-readable label of the first matching surface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SurfaceCheck {
    /// A negative result.
    #[must_use]
    pub const fn outside() -> Self {
        Self {
            in_surface: false,
            kind: None,
            label: None,
        }
    }

    /// A positive result.
    #[must_use]
    pub fn inside(kind: SurfaceKind, label: String) -> Self {
        Self {
            in_surface: true,
            kind: Some(kind),
            label: Some(label),
        }
    }
}
