//! Plain-text rendering of analysis results.

use std::fmt::Write as _;

use storm_impact_analytics_models::{ImpactDimension, ImpactReport, OutcomeAggregate};
use storm_impact_source::type_mapping::{MappingGap, permitted_labels};
use strum::IntoEnumIterator as _;

/// Renders both rankings and the stage counts as aligned tables.
pub fn render_report(report: &ImpactReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Dataset: {}", report.dataset);
    if let Some(year) = report.since_year {
        let _ = writeln!(out, "Events from {year} onward");
    }

    for dimension in ImpactDimension::iter() {
        out.push('\n');
        render_ranking(&mut out, dimension, report.ranking(dimension), report.top_n);
    }

    let stats = &report.stats;
    out.push('\n');
    let _ = writeln!(out, "Pipeline");
    for (label, value) in [
        ("Rows read", stats.rows_read),
        ("Malformed rows skipped", stats.malformed_rows),
        ("Before year window", stats.outside_year_window),
        ("Summary rows dropped", stats.summary_dropped),
        ("Unclassifiable dropped", stats.unclassifiable_dropped),
        ("Unmapped skipped", stats.unmapped_skipped),
        ("Canonical records", stats.canonical_records),
        ("Health subset", stats.health_records),
        ("Economic subset", stats.economic_records),
        ("Invalid damage units", stats.invalid_unit_excluded),
    ] {
        let _ = writeln!(out, "  {label:<24} {:>14}", group_digits(&value.to_string()));
    }

    out
}

fn render_ranking(
    out: &mut String,
    dimension: ImpactDimension,
    ranking: &[OutcomeAggregate],
    top_n: usize,
) {
    let (primary, secondary) = dimension.component_labels();
    let _ = writeln!(
        out,
        "Top {top_n} event types: {}",
        dimension.measure_label()
    );

    if ranking.is_empty() {
        let _ = writeln!(out, "  (no events)");
        return;
    }

    let _ = writeln!(
        out,
        "  {:>3}  {:<26} {:>18} {:>18} {:>18}",
        "#",
        "EVENT TYPE",
        dimension.measure_label().to_uppercase(),
        primary.to_uppercase(),
        secondary.to_uppercase()
    );
    for (rank, aggregate) in ranking.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}  {:<26} {:>18} {:>18} {:>18}",
            rank + 1,
            aggregate.category.as_ref(),
            format_measure(aggregate.measure),
            format_measure(aggregate.primary),
            format_measure(aggregate.secondary)
        );
    }
}

/// Renders mapping gaps as a two-column table, followed by the labels a
/// new mapping entry may use.
pub fn render_gaps(gaps: &[MappingGap]) -> String {
    let mut out = String::new();
    if gaps.is_empty() {
        let _ = writeln!(out, "All categories are mapped.");
        return out;
    }

    let _ = writeln!(out, "{:<40} {:>10}", "ORIGINAL TYPE", "ROWS");
    let _ = writeln!(out, "{}", "-".repeat(51));
    for gap in gaps {
        let _ = writeln!(
            out,
            "{:<40} {:>10}",
            gap.category,
            group_digits(&gap.rows.to_string())
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Permitted mapping targets:");
    for label in permitted_labels() {
        let _ = writeln!(out, "  {label}");
    }
    out
}

/// Formats a non-negative measure rounded to a whole number with
/// thousands separators.
fn format_measure(value: f64) -> String {
    group_digits(&format!("{:.0}", value.max(0.0)))
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_owned();
    }
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use storm_impact_analytics_models::PipelineStats;
    use storm_impact_event_models::EventType;

    use super::*;

    #[test]
    fn groups_digits() {
        assert_eq!(format_measure(0.0), "0");
        assert_eq!(format_measure(999.0), "999");
        assert_eq!(format_measure(1_000.0), "1,000");
        assert_eq!(format_measure(1_005_000_000.0), "1,005,000,000");
        assert_eq!(format_measure(60_000.4), "60,000");
    }

    #[test]
    fn renders_rankings_in_order() {
        let report = ImpactReport {
            dataset: "noaa_storm_data".to_owned(),
            top_n: 10,
            since_year: Some(1996),
            stats: PipelineStats::default(),
            health: vec![
                OutcomeAggregate {
                    category: EventType::Tornado,
                    measure: 6.0,
                    primary: 2.0,
                    secondary: 4.0,
                    events: 2,
                },
                OutcomeAggregate {
                    category: EventType::ExcessiveHeat,
                    measure: 5.0,
                    primary: 5.0,
                    secondary: 0.0,
                    events: 1,
                },
            ],
            economic: Vec::new(),
        };

        let text = render_report(&report);
        assert!(text.contains("Events from 1996 onward"));
        assert!(text.contains("Top 10 event types: Casualties"));
        assert!(text.contains("Top 10 event types: Damages (USD)"));
        assert!(text.contains("(no events)"));

        let tornado = text.find("TORNADO").unwrap();
        let heat = text.find("EXCESSIVE HEAT").unwrap();
        assert!(tornado < heat);
    }

    #[test]
    fn renders_gaps() {
        let gaps = vec![MappingGap {
            category: "MUDSLIDE".to_owned(),
            rows: 1_234,
        }];
        let text = render_gaps(&gaps);
        assert!(text.contains("MUDSLIDE"));
        assert!(text.contains("1,234"));
        assert!(text.contains("Permitted mapping targets:"));
        assert!(text.contains("  TORNADO\n"));
        assert!(text.contains("  UNCLASSIFIABLE\n"));
        assert_eq!(render_gaps(&[]), "All categories are mapped.\n");
    }
}
