//! Per-category aggregation and top-N ranking.

use std::collections::HashMap;

use storm_impact_analytics_models::{EconomicRecord, OutcomeAggregate};
use storm_impact_event_models::EventType;
use storm_impact_source_models::CanonicalEventRecord;

/// Groups `records` by category, sums the two measure components, and
/// returns the `top_n` largest totals.
///
/// Sorted by measure descending; equal measures are ordered by category
/// label ascending so the output is deterministic. Returns every category
/// when there are fewer than `top_n`.
#[must_use]
pub fn aggregate_and_rank<T>(
    records: &[T],
    top_n: usize,
    category: impl Fn(&T) -> EventType,
    components: impl Fn(&T) -> (f64, f64),
) -> Vec<OutcomeAggregate> {
    let mut groups: HashMap<EventType, OutcomeAggregate> = HashMap::new();

    for record in records {
        let key = category(record);
        let (primary, secondary) = components(record);
        let entry = groups.entry(key).or_insert_with(|| OutcomeAggregate {
            category: key,
            measure: 0.0,
            primary: 0.0,
            secondary: 0.0,
            events: 0,
        });
        entry.primary += primary;
        entry.secondary += secondary;
        entry.measure += primary + secondary;
        entry.events += 1;
    }

    let mut ranked: Vec<OutcomeAggregate> = groups.into_values().collect();
    ranked.sort_by(|a, b| {
        b.measure
            .total_cmp(&a.measure)
            .then_with(|| a.category.as_ref().cmp(b.category.as_ref()))
    });
    ranked.truncate(top_n);
    ranked
}

/// Ranks categories by fatalities plus injuries.
#[must_use]
pub fn rank_health(records: &[CanonicalEventRecord], top_n: usize) -> Vec<OutcomeAggregate> {
    aggregate_and_rank(
        records,
        top_n,
        |r| r.canonical_category,
        |r| {
            (
                f64::from(r.record.fatalities),
                f64::from(r.record.injuries),
            )
        },
    )
}

/// Ranks categories by scaled property plus crop damage.
#[must_use]
pub fn rank_economic(records: &[EconomicRecord], top_n: usize) -> Vec<OutcomeAggregate> {
    aggregate_and_rank(
        records,
        top_n,
        |r| r.category,
        |r| (r.property_damage, r.crop_damage),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use storm_impact_source_models::RawEventRecord;
    use strum::IntoEnumIterator as _;

    use super::*;

    fn health(category: EventType, fatalities: u32, injuries: u32) -> CanonicalEventRecord {
        CanonicalEventRecord {
            record: RawEventRecord {
                category: category.to_string(),
                occurred_at: NaiveDate::from_ymd_opt(2000, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                fatalities,
                injuries,
                property_damage: 0.0,
                property_damage_unit: String::new(),
                crop_damage: 0.0,
                crop_damage_unit: String::new(),
            },
            canonical_category: category,
        }
    }

    fn economic(category: EventType, property_damage: f64, crop_damage: f64) -> EconomicRecord {
        EconomicRecord {
            category,
            occurred_at: NaiveDate::from_ymd_opt(2000, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            property_damage,
            crop_damage,
        }
    }

    #[test]
    fn sums_casualties_per_category() {
        let records = vec![
            health(EventType::Tornado, 2, 1),
            health(EventType::Tornado, 0, 3),
            health(EventType::Flood, 5, 0),
        ];
        let ranked = rank_health(&records, 10);
        let pairs: Vec<(EventType, f64)> = ranked.iter().map(|a| (a.category, a.measure)).collect();
        assert_eq!(
            pairs,
            vec![(EventType::Tornado, 6.0), (EventType::Flood, 5.0)]
        );
        assert!((ranked[0].primary - 2.0).abs() < f64::EPSILON);
        assert!((ranked[0].secondary - 4.0).abs() < f64::EPSILON);
        assert_eq!(ranked[0].events, 2);
    }

    #[test]
    fn truncates_to_top_n() {
        let records: Vec<EconomicRecord> = EventType::iter()
            .take(15)
            .zip(1_u32..)
            .map(|(category, rank)| economic(category, f64::from(rank) * 1_000.0, 0.0))
            .collect();
        let ranked = rank_economic(&records, 10);
        assert_eq!(ranked.len(), 10);
        let measures: Vec<f64> = ranked.iter().map(|a| a.measure).collect();
        let expected: Vec<f64> = (6..=15).rev().map(|n| f64::from(n) * 1_000.0).collect();
        assert_eq!(measures, expected);
    }

    #[test]
    fn returns_all_when_fewer_than_top_n() {
        let records = vec![
            economic(EventType::Hail, 1.0, 2.0),
            economic(EventType::Drought, 0.0, 9.0),
        ];
        let ranked = rank_economic(&records, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].category, EventType::Drought);
    }

    #[test]
    fn breaks_ties_by_label() {
        let records = vec![
            health(EventType::Tornado, 1, 0),
            health(EventType::Avalanche, 1, 0),
            health(EventType::Heat, 0, 1),
        ];
        let ranked = rank_health(&records, 10);
        let order: Vec<EventType> = ranked.iter().map(|a| a.category).collect();
        assert_eq!(
            order,
            vec![EventType::Avalanche, EventType::Heat, EventType::Tornado]
        );
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(rank_health(&[], 10).is_empty());
    }

    #[test]
    fn ranks_arbitrary_rows_by_summed_components() {
        let rows = [
            (EventType::Lightning, 1.0, 1.0),
            (EventType::Blizzard, 3.0, 0.5),
            (EventType::Lightning, 0.0, 2.0),
        ];
        let ranked = aggregate_and_rank(&rows, 1, |row| row.0, |row| (row.1, row.2));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].category, EventType::Lightning);
        assert!((ranked[0].measure - 4.0).abs() < f64::EPSILON);
        assert_eq!(ranked[0].events, 2);
    }
}
