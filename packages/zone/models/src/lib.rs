#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Restricted-airspace facility and zone types.
//!
//! A facility is a fixed location surrounded by a circular restricted
//! zone. Red zones prohibit flight outright; yellow zones require prior
//! coordination with the facility operator.

use drone_map_geodesy::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Restriction level of a zone.
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
pub enum ZoneColor {
    /// Flight prohibited.
    Red,
    /// Flight restricted; requires coordination.
    Yellow,
}

impl ZoneColor {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Red, Self::Yellow]
    }
}

/// Kind of facility a zone protects.
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
pub enum FacilityCategory {
    /// Central government offices (Prime Minister's Office, ministries).
    Government,
    /// Imperial residences.
    Imperial,
    /// National Diet buildings.
    Legislature,
    /// Supreme Court.
    Judiciary,
    /// Political party headquarters.
    PoliticalParty,
    /// Embassies and other designated foreign missions.
    ForeignMission,
    /// Nuclear power stations and fuel-cycle facilities.
    Nuclear,
    /// Ministry of Defense and Self-Defense Force installations.
    Defense,
    /// Foreign military installations.
    Military,
    /// Police headquarters.
    Police,
    /// Prisons and detention houses.
    Prison,
    /// Prefectural government offices.
    Prefecture,
    /// Airports.
    Airport,
}

impl FacilityCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Government,
            Self::Imperial,
            Self::Legislature,
            Self::Judiciary,
            Self::PoliticalParty,
            Self::ForeignMission,
            Self::Nuclear,
            Self::Defense,
            Self::Military,
            Self::Police,
            Self::Prison,
            Self::Prefecture,
            Self::Airport,
        ]
    }
}

/// Optional descriptive data attached to a facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityMetadata {
    /// Operating organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Operating status (e.g. `"operating"`, `"suspended"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Capacity in free text (e.g. `"8212 MW"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
}

/// A fixed-location circular restricted zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFacility {
    /// Unique identifier (e.g. `"imperial-palace"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What kind of facility this is.
    pub category: FacilityCategory,
    /// Restriction level.
    #[serde(alias = "zone_color")]
    pub zone_color: ZoneColor,
    /// Centre of the zone.
    pub center: GeoPoint,
    /// Zone radius in kilometres, always positive.
    #[serde(alias = "radius_km")]
    pub radius_km: f64,
    /// Optional descriptive data.
    #[serde(default)]
    pub metadata: FacilityMetadata,
    /// For generated perimeter rings, the id of the red-zone facility the
    /// ring surrounds. `None` for catalog facilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter_of: Option<String>,
}

impl ZoneFacility {
    /// Whether this is a generated perimeter ring rather than catalog data.
    #[must_use]
    pub const fn is_perimeter(&self) -> bool {
        self.perimeter_of.is_some()
    }
}

/// Result of a radius containment check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCheck {
    /// Whether the point is inside any zone.
    pub in_zone: bool,
    /// The matching facility, if any.
    pub facility: Option<ZoneFacility>,
    /// Restriction level of the matching zone, if any.
    pub zone_color: Option<ZoneColor>,
}

impl ZoneCheck {
    /// A negative result.
    #[must_use]
    pub const fn outside() -> Self {
        Self {
            in_zone: false,
            facility: None,
            zone_color: None,
        }
    }

    /// A positive result for `facility`.
    #[must_use]
    pub fn inside(facility: ZoneFacility) -> Self {
        Self {
            in_zone: true,
            zone_color: Some(facility.zone_color),
            facility: Some(facility),
        }
    }
}

/// A facility paired with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyFacility {
    /// The facility.
    pub facility: ZoneFacility,
    /// Great-circle distance from the query point to the facility centre.
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_color_parses_from_snake_case() {
        assert_eq!("red".parse::<ZoneColor>().unwrap(), ZoneColor::Red);
        assert_eq!("yellow".parse::<ZoneColor>().unwrap(), ZoneColor::Yellow);
        assert!("green".parse::<ZoneColor>().is_err());
    }

    #[test]
    fn category_round_trips_through_string_form() {
        for category in FacilityCategory::all() {
            let parsed: FacilityCategory = category.as_ref().parse().unwrap();
            assert_eq!(parsed, *category);
        }
        assert_eq!(FacilityCategory::all().len(), 13);
        assert_eq!(FacilityCategory::ForeignMission.to_string(), "foreign_mission");
    }

    #[test]
    fn zone_check_inside_carries_color() {
        let facility = ZoneFacility {
            id: "test".to_string(),
            name: "Test".to_string(),
            category: FacilityCategory::Police,
            zone_color: ZoneColor::Yellow,
            center: GeoPoint::new(35.0, 139.0),
            radius_km: 0.1,
            metadata: FacilityMetadata::default(),
            perimeter_of: None,
        };
        let check = ZoneCheck::inside(facility);
        assert!(check.in_zone);
        assert_eq!(check.zone_color, Some(ZoneColor::Yellow));
        assert!(!ZoneCheck::outside().in_zone);
    }
}
