#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw and canonical storm event record types.
//!
//! The loader produces [`RawEventRecord`]s restricted to the eight columns
//! the analysis needs. Normalization turns each surviving record into a
//! [`CanonicalEventRecord`] that carries a permitted
//! [`EventType`] from [`storm_impact_event_models`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use storm_impact_event_models::EventType;
use strum_macros::{Display, EnumString};

/// One observed weather event, projected to the analysis columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventRecord {
    /// Free-text event category as recorded.
    pub category: String,
    /// Begin date of the event.
    pub occurred_at: NaiveDateTime,
    /// Direct and indirect deaths.
    pub fatalities: u32,
    /// Direct and indirect injuries.
    pub injuries: u32,
    /// Property damage amount, in units of [`Self::property_damage_unit`].
    pub property_damage: f64,
    /// Magnitude suffix for the property damage amount (`B`, `M`, `K`, or
    /// anything else, including empty, which is invalid).
    pub property_damage_unit: String,
    /// Crop damage amount, in units of [`Self::crop_damage_unit`].
    pub crop_damage: f64,
    /// Magnitude suffix for the crop damage amount.
    pub crop_damage_unit: String,
}

impl RawEventRecord {
    /// Returns `true` if anyone was killed or injured.
    #[must_use]
    pub const fn has_casualties(&self) -> bool {
        self.fatalities > 0 || self.injuries > 0
    }

    /// Returns `true` if either damage amount is positive.
    #[must_use]
    pub fn has_damage(&self) -> bool {
        self.property_damage > 0.0 || self.crop_damage > 0.0
    }

    /// Fatalities plus injuries.
    #[must_use]
    pub fn casualties(&self) -> u64 {
        u64::from(self.fatalities) + u64::from(self.injuries)
    }
}

/// A [`RawEventRecord`] whose category has been normalized and mapped onto
/// the permitted vocabulary.
///
/// `record.category` holds the trimmed, upper-cased label. Records mapped
/// to the unclassifiable sentinel never become a `CanonicalEventRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEventRecord {
    /// The source record with its normalized category label.
    pub record: RawEventRecord,
    /// The permitted event type the label maps to.
    pub canonical_category: EventType,
}

/// Magnitude code qualifying a raw damage amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DamageUnit {
    /// `K`: thousands of dollars.
    #[strum(serialize = "K")]
    Thousand,
    /// `M`: millions of dollars.
    #[strum(serialize = "M")]
    Million,
    /// `B`: billions of dollars.
    #[strum(serialize = "B")]
    Billion,
}

impl DamageUnit {
    /// Parses a unit suffix, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUnitError`] for anything other than `B`, `M` or `K`,
    /// including the empty string.
    pub fn from_suffix(suffix: &str) -> Result<Self, InvalidUnitError> {
        suffix.parse().map_err(|_| InvalidUnitError {
            unit: suffix.to_owned(),
        })
    }

    /// The factor this unit multiplies an amount by.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Thousand => 1e3,
            Self::Million => 1e6,
            Self::Billion => 1e9,
        }
    }

    /// Converts an amount in this unit to an absolute amount.
    #[must_use]
    pub fn apply(self, amount: f64) -> f64 {
        amount * self.multiplier()
    }
}

/// Error returned when a damage unit suffix is not one of `B`, `M`, `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUnitError {
    /// The suffix that was rejected.
    pub unit: String,
}

impl std::fmt::Display for InvalidUnitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid damage unit '{}': expected one of B, M, K",
            self.unit
        )
    }
}

impl std::error::Error for InvalidUnitError {}

/// Which kind of value in a row failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MalformedField {
    /// The begin-date timestamp.
    Timestamp,
    /// A fatality or injury count.
    Count,
    /// A damage amount.
    Amount,
}

/// A row that could not be turned into a [`RawEventRecord`].
///
/// Malformed rows are skipped and counted; they never abort a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRowError {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    /// Source column holding the bad value.
    pub column: String,
    /// The offending value.
    pub value: String,
    /// What the value was expected to be.
    pub field: MalformedField,
}

impl std::fmt::Display for MalformedRowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: unparseable {} '{}' in column {}",
            self.line, self.field, self.value, self.column
        )
    }
}

impl std::error::Error for MalformedRowError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fatalities: u32, injuries: u32, property: f64, crop: f64) -> RawEventRecord {
        RawEventRecord {
            category: "TORNADO".to_string(),
            occurred_at: NaiveDateTime::default(),
            fatalities,
            injuries,
            property_damage: property,
            property_damage_unit: "K".to_string(),
            crop_damage: crop,
            crop_damage_unit: "K".to_string(),
        }
    }

    #[test]
    fn parses_unit_suffixes_case_insensitively() {
        assert_eq!(DamageUnit::from_suffix("K").unwrap(), DamageUnit::Thousand);
        assert_eq!(DamageUnit::from_suffix("m").unwrap(), DamageUnit::Million);
        assert_eq!(DamageUnit::from_suffix("b").unwrap(), DamageUnit::Billion);
    }

    #[test]
    fn rejects_empty_and_unknown_suffixes() {
        assert!(DamageUnit::from_suffix("").is_err());
        assert!(DamageUnit::from_suffix("H").is_err());
        assert!(DamageUnit::from_suffix("+").is_err());
        assert!(DamageUnit::from_suffix("KK").is_err());
        assert!(DamageUnit::from_suffix(" K").is_err());
    }

    #[test]
    fn invalid_unit_error_keeps_original_text() {
        let err = DamageUnit::from_suffix("h").unwrap_err();
        assert_eq!(err.unit, "h");
    }

    #[test]
    fn applies_multiplier() {
        assert!((DamageUnit::Million.apply(2.5) - 2_500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn casualties_sum_fatalities_and_injuries() {
        let r = record(2, 3, 0.0, 0.0);
        assert_eq!(r.casualties(), 5);
        assert!(r.has_casualties());
        assert!(!r.has_damage());
    }

    #[test]
    fn crop_damage_alone_counts_as_damage() {
        assert!(record(0, 0, 0.0, 1.0).has_damage());
    }

    #[test]
    fn malformed_row_message_names_column() {
        let err = MalformedRowError {
            line: 12,
            column: "BGN_DATE".to_string(),
            value: "yesterday".to_string(),
            field: MalformedField::Timestamp,
        };
        assert_eq!(
            err.to_string(),
            "line 12: unparseable timestamp 'yesterday' in column BGN_DATE"
        );
    }
}
