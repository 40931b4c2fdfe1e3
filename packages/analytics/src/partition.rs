//! Splits canonical records into health and economic subsets.

use storm_impact_analytics_models::EconomicRecord;
use storm_impact_source::scaling::{is_valid_suffix, scale};
use storm_impact_source_models::{CanonicalEventRecord, InvalidUnitError};

/// The two (possibly overlapping) outcome subsets.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Records with at least one fatality or injury.
    pub health: Vec<CanonicalEventRecord>,
    /// Records with damage and valid units on both damage fields, scaled to
    /// dollars.
    pub economic: Vec<EconomicRecord>,
    /// Damage-bearing records excluded because either unit suffix was
    /// invalid.
    pub invalid_unit_excluded: u64,
}

/// Partitions `records` into health and economic subsets.
///
/// A record may land in both, one, or neither. A record only enters the
/// economic subset when *both* unit suffixes are valid, even if one of the
/// two amounts is zero.
///
/// # Errors
///
/// Returns [`InvalidUnitError`] only if scaling rejects a suffix that
/// already passed validation, which indicates a bug.
pub fn partition(records: &[CanonicalEventRecord]) -> Result<Partition, InvalidUnitError> {
    let mut out = Partition::default();

    for canonical in records {
        let record = &canonical.record;

        if record.has_casualties() {
            out.health.push(canonical.clone());
        }

        if !record.has_damage() {
            continue;
        }
        if !is_valid_suffix(&record.property_damage_unit)
            || !is_valid_suffix(&record.crop_damage_unit)
        {
            out.invalid_unit_excluded += 1;
            continue;
        }

        out.economic.push(EconomicRecord {
            category: canonical.canonical_category,
            occurred_at: record.occurred_at,
            property_damage: scale(record.property_damage, &record.property_damage_unit)?,
            crop_damage: scale(record.crop_damage, &record.crop_damage_unit)?,
        });
    }

    log::info!(
        "Partitioned {} records: {} health, {} economic ({} excluded for invalid units)",
        records.len(),
        out.health.len(),
        out.economic.len(),
        out.invalid_unit_excluded
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use storm_impact_event_models::EventType;
    use storm_impact_source_models::RawEventRecord;

    use super::*;

    fn canonical(
        fatalities: u32,
        injuries: u32,
        property: (f64, &str),
        crop: (f64, &str),
    ) -> CanonicalEventRecord {
        CanonicalEventRecord {
            record: RawEventRecord {
                category: "TORNADO".to_owned(),
                occurred_at: NaiveDate::from_ymd_opt(2011, 4, 27)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                fatalities,
                injuries,
                property_damage: property.0,
                property_damage_unit: property.1.to_owned(),
                crop_damage: crop.0,
                crop_damage_unit: crop.1.to_owned(),
            },
            canonical_category: EventType::Tornado,
        }
    }

    #[test]
    fn health_requires_casualties() {
        let records = vec![
            canonical(0, 0, (0.0, ""), (0.0, "")),
            canonical(1, 0, (0.0, ""), (0.0, "")),
            canonical(0, 4, (0.0, ""), (0.0, "")),
        ];
        let out = partition(&records).unwrap();
        assert_eq!(out.health.len(), 2);
        assert!(out.economic.is_empty());
        assert_eq!(out.invalid_unit_excluded, 0);
    }

    #[test]
    fn economic_excludes_record_with_invalid_crop_unit() {
        let records = vec![canonical(0, 0, (100.0, "K"), (0.0, ""))];
        let out = partition(&records).unwrap();
        assert!(out.economic.is_empty());
        assert_eq!(out.invalid_unit_excluded, 1);
    }

    #[test]
    fn economic_excludes_record_with_invalid_property_unit() {
        let records = vec![canonical(0, 0, (0.0, "?"), (5.0, "M"))];
        let out = partition(&records).unwrap();
        assert!(out.economic.is_empty());
    }

    #[test]
    fn economic_scales_both_amounts() {
        let records = vec![canonical(0, 0, (2.5, "M"), (3.0, "k"))];
        let out = partition(&records).unwrap();
        assert_eq!(out.economic.len(), 1);
        let economic = &out.economic[0];
        assert!((economic.property_damage - 2_500_000.0).abs() < 1e-6);
        assert!((economic.crop_damage - 3_000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_damage_with_valid_units_is_not_economic() {
        let records = vec![canonical(0, 0, (0.0, "K"), (0.0, "K"))];
        let out = partition(&records).unwrap();
        assert!(out.economic.is_empty());
        assert_eq!(out.invalid_unit_excluded, 0);
    }

    #[test]
    fn subsets_are_not_exclusive() {
        let records = vec![canonical(3, 0, (1.0, "B"), (0.0, "K"))];
        let out = partition(&records).unwrap();
        assert_eq!(out.health.len(), 1);
        assert_eq!(out.economic.len(), 1);
        assert_eq!(out.economic[0].category, EventType::Tornado);
    }
}
