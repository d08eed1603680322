//! Compile-time registry of restricted facility data.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Files are concatenated in the order listed here, which is the catalog
//! order used by first-match containment. Adding a facility group
//! requires creating a TOML file in `facilities/` and adding a
//! corresponding entry here.

use drone_map_zone_models::ZoneFacility;
use serde::Deserialize;

use crate::CatalogError;

/// Number of registered facility files. Enforced by a test.
#[cfg(test)]
const EXPECTED_FILE_COUNT: usize = 8;

/// Number of facilities across all files. Enforced by a test.
#[cfg(test)]
const EXPECTED_FACILITY_COUNT: usize = 201;

/// Number of prefectures; each has one office and one police headquarters.
#[cfg(test)]
const PREFECTURE_COUNT: usize = 47;

/// Embedded TOML facility definitions, in catalog order.
const FACILITY_TOMLS: &[(&str, &str)] = &[
    ("imperial", include_str!("../facilities/imperial.toml")),
    ("government", include_str!("../facilities/government.toml")),
    (
        "foreign_missions",
        include_str!("../facilities/foreign_missions.toml"),
    ),
    ("defense", include_str!("../facilities/defense.toml")),
    ("nuclear", include_str!("../facilities/nuclear.toml")),
    ("public_safety", include_str!("../facilities/public_safety.toml")),
    ("prefecture", include_str!("../facilities/prefecture.toml")),
    ("airports", include_str!("../facilities/airports.toml")),
];

#[derive(Debug, Deserialize)]
struct FacilityFile {
    #[serde(default)]
    facilities: Vec<ZoneFacility>,
}

/// Parses one facility TOML document.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] if the document is not valid facility
/// TOML.
pub fn parse_facilities(name: &str, toml_str: &str) -> Result<Vec<ZoneFacility>, CatalogError> {
    toml::de::from_str::<FacilityFile>(toml_str)
        .map(|file| file.facilities)
        .map_err(|source| CatalogError::Parse {
            name: name.to_string(),
            source,
        })
}

/// Parses every embedded file and concatenates the facilities in
/// registry order. No cross-file validation happens here; see
/// [`crate::ZoneCatalog::new`].
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] if any embedded file is malformed.
pub fn load_facilities() -> Result<Vec<ZoneFacility>, CatalogError> {
    let mut facilities = Vec::new();
    for (name, toml_str) in FACILITY_TOMLS {
        let parsed = parse_facilities(name, toml_str)?;
        log::debug!("Facility file '{name}': {} entries", parsed.len());
        facilities.extend(parsed);
    }
    Ok(facilities)
}

/// Returns all registered facilities.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught during CI.
#[must_use]
pub fn all_facilities() -> Vec<ZoneFacility> {
    load_facilities().unwrap_or_else(|e| panic!("{e}"))
}
