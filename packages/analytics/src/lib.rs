#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storm impact analysis pipeline.
//!
//! Loader → normalizer → partitioner → ranker, run once over a source file
//! to produce the health and economic rankings in an [`ImpactReport`].

pub mod partition;
pub mod ranking;

use std::path::Path;
use std::sync::Arc;

use chrono::Datelike as _;
use storm_impact_analytics_models::{ImpactReport, PipelineStats};
use storm_impact_source::SourceError;
use storm_impact_source::dataset_def::{AnalysisSettings, DatasetDefinition};
use storm_impact_source::loader::{EventRecords, RecordLoader};
use storm_impact_source::progress::ProgressCallback;
use storm_impact_source::type_mapping::{
    CategoryMapping, CategoryNormalizer, NormalizeError, UnmappedCategoryError, UnmappedPolicy,
};
use storm_impact_source_models::InvalidUnitError;
use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The source file or mapping could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A category has no mapping entry.
    #[error(transparent)]
    Unmapped(#[from] UnmappedCategoryError),

    /// Scaling rejected a unit suffix that had already been validated.
    #[error("internal error: validated damage unit rejected by scaler: {0}")]
    InvalidUnit(#[from] InvalidUnitError),
}

impl From<NormalizeError> for AnalyticsError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::Source(e) => Self::Source(e),
            NormalizeError::Unmapped(e) => Self::Unmapped(e),
        }
    }
}

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Maximum entries per ranking.
    pub top_n: usize,
    /// Handling of categories missing from the mapping.
    pub unmapped: UnmappedPolicy,
    /// Drop events that began before this year.
    pub since_year: Option<i32>,
}

impl From<&AnalysisSettings> for AnalysisOptions {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            top_n: settings.top_n,
            unmapped: settings.unmapped,
            since_year: settings.since_year,
        }
    }
}

/// Loads `path` with `definition` and runs the full analysis.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the file cannot be read, a category is
/// unmapped under [`UnmappedPolicy::Fail`], or scaling fails.
pub fn analyze_file(
    path: &Path,
    definition: &DatasetDefinition,
    mapping: &CategoryMapping,
    options: &AnalysisOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<ImpactReport, AnalyticsError> {
    let mut records = RecordLoader::new(definition)
        .with_progress(progress)
        .open(path)?;
    analyze_records(&mut records, definition.id(), mapping, options)
}

/// Runs the full analysis over an open record stream.
///
/// # Errors
///
/// See [`analyze_file`].
pub fn analyze_records(
    records: &mut EventRecords,
    dataset: &str,
    mapping: &CategoryMapping,
    options: &AnalysisOptions,
) -> Result<ImpactReport, AnalyticsError> {
    let mut outside_year_window = 0_u64;
    let in_window = records.by_ref().filter(|record| match (record, options.since_year) {
        (Ok(record), Some(year)) if record.occurred_at.year() < year => {
            outside_year_window += 1;
            false
        }
        _ => true,
    });

    let mut normalizer = CategoryNormalizer::new(mapping).with_policy(options.unmapped);
    let canonical = normalizer.normalize_all(in_window)?;
    let normalize_stats = normalizer.stats();
    let load_stats = records.stats();

    if let Some(year) = options.since_year {
        log::info!("Dropped {outside_year_window} records that began before {year}");
    }

    let partition = partition::partition(&canonical)?;
    let health = ranking::rank_health(&partition.health, options.top_n);
    let economic = ranking::rank_economic(&partition.economic, options.top_n);
    log::debug!(
        "Ranked {} health and {} economic categories",
        health.len(),
        economic.len()
    );

    let stats = PipelineStats {
        rows_read: load_stats.rows_read,
        malformed_rows: load_stats.malformed_rows,
        outside_year_window,
        summary_dropped: normalize_stats.summary_dropped,
        unclassifiable_dropped: normalize_stats.unclassifiable_dropped,
        unmapped_skipped: normalize_stats.unmapped_skipped,
        canonical_records: normalize_stats.canonical,
        health_records: partition.health.len() as u64,
        economic_records: partition.economic.len() as u64,
        invalid_unit_excluded: partition.invalid_unit_excluded,
    };

    Ok(ImpactReport {
        dataset: dataset.to_owned(),
        top_n: options.top_n,
        since_year: options.since_year,
        stats,
        health,
        economic,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use storm_impact_event_models::EventType;
    use storm_impact_source::registry::default_dataset;

    use super::*;

    const DATA: &str = "\
STATE__,BGN_DATE,EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP
1,4/18/1950 0:00:00,TORNADO,2,1,25,K,0,K
1,5/3/1999 0:00:00,tornado ,0,3,1.5,B,0,
1,6/1/1995 0:00:00,TSTM WIND,0,0,50,K,10,K
1,7/4/1995 0:00:00,EXCESSIVE HEAT,5,0,0,,0,
1,7/23/1993 0:00:00,Summary of July 23,9,9,9,M,9,M
1,8/1/1996 0:00:00,APACHE COUNTY,1,1,1,M,1,M
1,bad date,TORNADO,1,1,1,M,1,M
1,8/29/2005 0:00:00,HURRICANE/TYPHOON,0,0,1,B,5,M
";

    const MAPPING: &str = "\
originalType,modifiedType
TORNADO,TORNADO
TSTM WIND,THUNDERSTORM WIND
EXCESSIVE HEAT,EXCESSIVE HEAT
APACHE COUNTY,OTHER
HURRICANE/TYPHOON,HURRICANE (TYPHOON)
";

    fn run(
        data: &str,
        mapping: &str,
        options: &AnalysisOptions,
    ) -> Result<ImpactReport, AnalyticsError> {
        let def = default_dataset();
        let mapping = CategoryMapping::from_reader(mapping.as_bytes(), "mapping.csv").unwrap();
        let mut records = RecordLoader::new(&def)
            .read(Box::new(Cursor::new(data.as_bytes().to_vec())), "data.csv")
            .unwrap();
        analyze_records(&mut records, def.id(), &mapping, options)
    }

    fn options() -> AnalysisOptions {
        AnalysisOptions::from(&AnalysisSettings::default())
    }

    #[test]
    fn ranks_health_and_economic_impact() {
        let report = run(DATA, MAPPING, &options()).unwrap();

        let health: Vec<(EventType, f64)> =
            report.health.iter().map(|a| (a.category, a.measure)).collect();
        assert_eq!(
            health,
            vec![(EventType::Tornado, 6.0), (EventType::ExcessiveHeat, 5.0)]
        );

        // The 1999 tornado has an empty crop unit and is left out.
        let economic: Vec<EventType> = report.economic.iter().map(|a| a.category).collect();
        assert_eq!(
            economic,
            vec![
                EventType::HurricaneTyphoon,
                EventType::ThunderstormWind,
                EventType::Tornado,
            ]
        );
        assert!((report.economic[0].measure - 1_005_000_000.0).abs() < 1e-3);
        assert!((report.economic[1].measure - 60_000.0).abs() < 1e-6);

        assert_eq!(
            report.stats,
            PipelineStats {
                rows_read: 8,
                malformed_rows: 1,
                outside_year_window: 0,
                summary_dropped: 1,
                unclassifiable_dropped: 1,
                unmapped_skipped: 0,
                canonical_records: 5,
                health_records: 3,
                economic_records: 3,
                invalid_unit_excluded: 1,
            }
        );
    }

    #[test]
    fn unmapped_category_aborts_by_default() {
        let data = format!("{DATA}1,1/1/2000 0:00:00,FUNNEL CLOUD,0,0,0,,0,\n");
        let err = run(&data, MAPPING, &options()).unwrap_err();
        match err {
            AnalyticsError::Unmapped(e) => assert_eq!(e.category, "FUNNEL CLOUD"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skip_policy_continues_past_unmapped() {
        let data = format!("{DATA}1,1/1/2000 0:00:00,FUNNEL CLOUD,0,0,0,,0,\n");
        let options = AnalysisOptions {
            unmapped: UnmappedPolicy::Skip,
            ..options()
        };
        let report = run(&data, MAPPING, &options).unwrap();
        assert_eq!(report.stats.unmapped_skipped, 1);
        assert_eq!(report.health.len(), 2);
    }

    #[test]
    fn since_year_drops_older_events() {
        let options = AnalysisOptions {
            since_year: Some(1996),
            ..options()
        };
        let report = run(DATA, MAPPING, &options).unwrap();
        assert_eq!(report.stats.outside_year_window, 4);
        let health: Vec<(EventType, f64)> =
            report.health.iter().map(|a| (a.category, a.measure)).collect();
        assert_eq!(health, vec![(EventType::Tornado, 3.0)]);
        assert_eq!(report.since_year, Some(1996));
    }

    #[test]
    fn top_n_limits_both_rankings() {
        let options = AnalysisOptions {
            top_n: 1,
            ..options()
        };
        let report = run(DATA, MAPPING, &options).unwrap();
        assert_eq!(report.health.len(), 1);
        assert_eq!(report.economic.len(), 1);
    }
}
