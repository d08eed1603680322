//! Free-text classification of restriction-surface features.
//!
//! Upstream features carry no structured surface type, only names and
//! descriptive strings. Rules are tried in order against every string
//! property; more specific labels must come before the shorter labels
//! they contain ("延長進入" before "進入", "外側水平" before "水平").

use drone_map_surface_models::{SurfaceKind, SurfaceStyle};
use geojson::{Feature, JsonObject, JsonValue};
use serde_json::json;

/// Result of classifying one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Detected surface kind.
    pub kind: SurfaceKind,
    /// Paint style for the kind.
    pub style: SurfaceStyle,
    /// Human-readable label for the kind.
    pub label: String,
}

impl Classification {
    fn of(kind: SurfaceKind) -> Self {
        Self {
            kind,
            style: kind.style(),
            label: kind.label().to_string(),
        }
    }
}

struct Haystack {
    text: String,
    folded: String,
}

impl Haystack {
    fn new(text: String) -> Self {
        let folded = text.to_lowercase().replace(['_', '-'], " ");
        Self { text, folded }
    }

    fn mentions(&self, japanese: &str, english: &str) -> bool {
        self.text.contains(japanese) || self.folded.contains(english)
    }
}

type Rule = (fn(&Haystack) -> bool, SurfaceKind);

const RULES: &[Rule] = &[
    (
        |h| h.mentions("延長進入", "extended approach"),
        SurfaceKind::ExtendedApproach,
    ),
    (|h| h.mentions("進入", "approach"), SurfaceKind::Approach),
    (
        |h| h.mentions("転移", "transitional"),
        SurfaceKind::Transitional,
    ),
    (
        |h| h.mentions("外側水平", "outer horizontal"),
        SurfaceKind::OuterHorizontal,
    ),
    (|h| h.mentions("水平", "horizontal"), SurfaceKind::Horizontal),
    (|h| h.mentions("円錐", "conical"), SurfaceKind::Conical),
];

/// Joins `name` and every other string-valued property, in that order.
fn haystack(properties: &JsonObject) -> Haystack {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(JsonValue::String(name)) = properties.get("name") {
        parts.push(name);
    }
    for (key, value) in properties {
        if key == "name" {
            continue;
        }
        if let JsonValue::String(s) = value {
            parts.push(s);
        }
    }
    Haystack::new(parts.join(" "))
}

/// Classifies a feature from its properties.
#[must_use]
pub fn classify(properties: &JsonObject) -> Classification {
    let haystack = haystack(properties);
    let kind = RULES
        .iter()
        .find(|(matches, _)| matches(&haystack))
        .map_or(SurfaceKind::Other, |(_, kind)| *kind);
    Classification::of(kind)
}

/// Classifies `feature` and writes the result into its properties so the
/// map layer can use them as paint expressions.
pub fn apply(feature: &mut Feature) -> Classification {
    let properties = feature.properties.get_or_insert_with(JsonObject::new);
    let classification = classify(properties);
    let style = classification.style;

    properties.insert("kind".to_string(), json!(classification.kind.as_ref()));
    properties.insert("label".to_string(), json!(classification.label));
    properties.insert("fillColor".to_string(), json!(style.fill_color));
    properties.insert("lineColor".to_string(), json!(style.line_color));
    properties.insert("fillOpacity".to_string(), json!(style.fill_opacity));
    properties.insert("lineOpacity".to_string(), json!(style.line_opacity));
    properties.insert("lineWidth".to_string(), json!(style.line_width));

    classification
}
