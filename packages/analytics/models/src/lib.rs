#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for storm impact analysis.
//!
//! An analysis produces two ranked lists of [`OutcomeAggregate`]s, one per
//! [`ImpactDimension`], wrapped in an [`ImpactReport`] together with the
//! [`PipelineStats`] describing how many rows each stage kept or dropped.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use storm_impact_event_models::EventType;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Which outcome a ranking measures.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImpactDimension {
    /// Population health: fatalities plus injuries.
    Health,
    /// Economic: property plus crop damage in dollars.
    Economic,
}

impl ImpactDimension {
    /// Name of the summed measure.
    #[must_use]
    pub const fn measure_label(self) -> &'static str {
        match self {
            Self::Health => "Casualties",
            Self::Economic => "Damages (USD)",
        }
    }

    /// Names of the two components that make up the measure.
    #[must_use]
    pub const fn component_labels(self) -> (&'static str, &'static str) {
        match self {
            Self::Health => ("Fatalities", "Injuries"),
            Self::Economic => ("Property", "Crop"),
        }
    }
}

/// A canonical event whose damage amounts have been scaled to dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicRecord {
    /// Canonical event type.
    pub category: EventType,
    /// Begin date of the event.
    pub occurred_at: NaiveDateTime,
    /// Property damage in dollars.
    pub property_damage: f64,
    /// Crop damage in dollars.
    pub crop_damage: f64,
}

/// Summed outcome for one canonical category.
///
/// Whole-number sums (always the case for casualty counts) serialize as
/// JSON integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeAggregate {
    /// Canonical event type.
    pub category: EventType,
    /// Summed measure (`primary + secondary`).
    #[serde(serialize_with = "serialize_measure")]
    pub measure: f64,
    /// Fatalities, or property damage.
    #[serde(serialize_with = "serialize_measure")]
    pub primary: f64,
    /// Injuries, or crop damage.
    #[serde(serialize_with = "serialize_measure")]
    pub secondary: f64,
    /// Number of records that contributed.
    pub events: u64,
}

/// Largest magnitude below which every whole `f64` is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[allow(
    clippy::trivially_copy_pass_by_ref,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn serialize_measure<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && (0.0..=MAX_EXACT_INTEGER).contains(value) {
        return serializer.serialize_u64(*value as u64);
    }
    serializer.serialize_f64(*value)
}

/// Row counts for each pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    /// Data rows read from the source.
    pub rows_read: u64,
    /// Rows skipped because a field could not be parsed.
    pub malformed_rows: u64,
    /// Rows dropped for beginning before the configured year.
    pub outside_year_window: u64,
    /// Rows dropped as summary artifacts.
    pub summary_dropped: u64,
    /// Rows mapped to the unclassifiable sentinel.
    pub unclassifiable_dropped: u64,
    /// Rows dropped because their category was unmapped.
    pub unmapped_skipped: u64,
    /// Rows that reached partitioning.
    pub canonical_records: u64,
    /// Size of the health subset.
    pub health_records: u64,
    /// Size of the economic subset.
    pub economic_records: u64,
    /// Damage-bearing rows left out of the economic subset because a unit
    /// suffix was invalid.
    pub invalid_unit_excluded: u64,
}

/// Full output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// Dataset definition the source was read with.
    pub dataset: String,
    /// Maximum entries per ranking.
    pub top_n: usize,
    /// Earliest year included, if filtered.
    pub since_year: Option<i32>,
    /// Stage counts.
    pub stats: PipelineStats,
    /// Categories ranked by casualties.
    pub health: Vec<OutcomeAggregate>,
    /// Categories ranked by damages.
    pub economic: Vec<OutcomeAggregate>,
}

impl ImpactReport {
    /// The ranking for `dimension`.
    #[must_use]
    pub fn ranking(&self, dimension: ImpactDimension) -> &[OutcomeAggregate] {
        match dimension {
            ImpactDimension::Health => &self.health,
            ImpactDimension::Economic => &self.economic,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn dimension_labels() {
        assert_eq!(ImpactDimension::Health.to_string(), "health");
        assert_eq!(
            "economic".parse::<ImpactDimension>().unwrap(),
            ImpactDimension::Economic
        );
        assert_eq!(ImpactDimension::iter().count(), 2);
        assert_eq!(
            ImpactDimension::Economic.component_labels(),
            ("Property", "Crop")
        );
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ImpactReport {
            dataset: "noaa_storm_data".to_owned(),
            top_n: 10,
            since_year: None,
            stats: PipelineStats {
                rows_read: 3,
                ..PipelineStats::default()
            },
            health: vec![OutcomeAggregate {
                category: EventType::Tornado,
                measure: 6.0,
                primary: 2.0,
                secondary: 4.0,
                events: 2,
            }],
            economic: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["topN"], 10);
        assert_eq!(json["stats"]["rowsRead"], 3);
        assert_eq!(json["health"][0]["category"], "TORNADO");
        assert_eq!(report.ranking(ImpactDimension::Health).len(), 1);
    }

    #[test]
    fn whole_measures_serialize_as_integers() {
        let aggregate = OutcomeAggregate {
            category: EventType::Tornado,
            measure: 6.0,
            primary: 2.0,
            secondary: 4.0,
            events: 2,
        };
        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["measure"], 6);
        assert!(json["measure"].is_u64());
        assert!(json["primary"].is_u64());
        assert_eq!(json["secondary"], 4);
        assert_eq!(
            serde_json::to_string(&aggregate).unwrap(),
            r#"{"category":"TORNADO","measure":6,"primary":2,"secondary":4,"events":2}"#
        );

        let parsed: OutcomeAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, aggregate);
    }

    #[test]
    fn fractional_measures_stay_floats() {
        let aggregate = OutcomeAggregate {
            category: EventType::Hail,
            measure: 2_500.5,
            primary: 2_500.25,
            secondary: 0.25,
            events: 1,
        };
        let json = serde_json::to_value(&aggregate).unwrap();
        assert!(json["measure"].is_f64());
        assert_eq!(json["measure"], 2_500.5);
    }
}
