//! Classified tile contents with a per-tile spatial index.

use drone_map_geodesy::GeoPoint;
use drone_map_surface_models::SurfaceKind;
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, PolygonType, Position};
use rstar::{AABB, RTree, RTreeObject};

use crate::classifier::{self, Classification};
use crate::containment::point_in_multi_polygon;

/// One classified restriction-surface feature.
#[derive(Debug, Clone)]
pub struct SurfaceFeature {
    /// Detected surface kind.
    pub kind: SurfaceKind,
    /// Human-readable label for the kind.
    pub label: String,
    /// The upstream feature with classification properties injected.
    pub feature: Feature,
    /// Area geometry for containment tests. `None` for features that
    /// are not polygons (they are still rendered).
    pub area: Option<MultiPolygon<f64>>,
}

impl SurfaceFeature {
    /// Classifies a raw upstream feature.
    ///
    /// Returns `None` for features without geometry or with a polygon
    /// geometry that cannot be used (rings with fewer than four
    /// positions, positions with fewer than two finite ordinates).
    #[must_use]
    pub fn from_raw(mut feature: Feature) -> Option<Self> {
        let area = match &feature.geometry.as_ref()?.value {
            geojson::Value::Polygon(rings) => Some(MultiPolygon(vec![polygon_from_rings(rings)?])),
            geojson::Value::MultiPolygon(polygons) => Some(MultiPolygon(
                polygons
                    .iter()
                    .map(polygon_from_rings)
                    .collect::<Option<Vec<_>>>()?,
            )),
            _ => None,
        };

        let Classification { kind, label, .. } = classifier::apply(&mut feature);

        Some(Self {
            kind,
            label,
            feature,
            area,
        })
    }

    /// Whether `point` lies inside this feature's area.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.area
            .as_ref()
            .is_some_and(|area| point_in_multi_polygon(point.to_coord(), area))
    }
}

fn ring_from_positions(positions: &[Position]) -> Option<LineString<f64>> {
    if positions.len() < 4 {
        return None;
    }
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::from)
}

fn polygon_from_rings(rings: &PolygonType) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    let exterior = ring_from_positions(exterior)?;
    let holes = holes
        .iter()
        .map(|ring| ring_from_positions(ring))
        .collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, holes))
}

/// Bounding box of one feature's area, keyed by its position in the tile.
struct AreaEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for AreaEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// All classified features of one tile.
///
/// Containment checks consult an R-tree of feature bounding boxes first,
/// then test candidates in upstream order so the first match is
/// deterministic.
pub struct TileFeatures {
    features: Vec<SurfaceFeature>,
    index: RTree<AreaEnvelope>,
}

impl TileFeatures {
    /// Indexes already-classified features.
    #[must_use]
    pub fn new(features: Vec<SurfaceFeature>) -> Self {
        let envelopes = features
            .iter()
            .enumerate()
            .filter_map(|(position, feature)| {
                let rect = feature.area.as_ref()?.bounding_rect()?;
                Some(AreaEnvelope {
                    position,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        Self {
            features,
            index: RTree::bulk_load(envelopes),
        }
    }

    /// A tile with no features.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Classifies every usable feature of a raw tile, dropping the rest.
    #[must_use]
    pub fn from_collection(collection: FeatureCollection) -> Self {
        let total = collection.features.len();
        let features: Vec<SurfaceFeature> = collection
            .features
            .into_iter()
            .filter_map(SurfaceFeature::from_raw)
            .collect();
        if features.len() < total {
            log::debug!(
                "Dropped {} of {total} surface features with unusable geometry",
                total - features.len()
            );
        }
        Self::new(features)
    }

    /// Features in upstream order.
    #[must_use]
    pub fn features(&self) -> &[SurfaceFeature] {
        &self.features
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the tile has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// First feature, in upstream order, whose area contains `point`.
    #[must_use]
    pub fn first_containing(&self, point: GeoPoint) -> Option<&SurfaceFeature> {
        let mut candidates: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&AABB::from_point([point.lng, point.lat]))
            .map(|entry| entry.position)
            .collect();
        candidates.sort_unstable();

        candidates
            .into_iter()
            .map(|position| &self.features[position])
            .find(|feature| feature.contains(point))
    }
}

impl std::fmt::Debug for TileFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileFeatures")
            .field("features", &self.features.len())
            .field("indexed", &self.index.size())
            .finish()
    }
}
