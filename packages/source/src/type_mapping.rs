//! Event category mapping and normalization.
//!
//! Raw NOAA event labels are free text (`"TSTM WIND"`, `" Flash Flood "`,
//! `"SUMMARY OF JULY 23"`). Normalization is a two-step contract: trim and
//! upper-case the label, then look it up in an external
//! [`CategoryMapping`] that assigns every surviving label a canonical
//! [`EventType`] or the unclassifiable sentinel. A label missing from the
//! mapping is an error, never a silent default.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use storm_impact_event_models::{CanonicalCategory, EventType};
use storm_impact_source_models::{CanonicalEventRecord, RawEventRecord};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::SourceError;

/// Header of the mapping column holding the normalized raw label.
pub const ORIGINAL_COLUMN: &str = "originalType";

/// Header of the mapping column holding the canonical category.
pub const CANONICAL_COLUMN: &str = "modifiedType";

/// Marker for NOAA monthly/storm summary rows, which are not events.
const SUMMARY_MARKER: &str = "SUMMARY";

/// What to do with a label that has no mapping entry.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UnmappedPolicy {
    /// Abort with [`UnmappedCategoryError`].
    #[default]
    Fail,
    /// Drop the row, warn once per distinct label, and keep going.
    Skip,
}

/// Trims surrounding whitespace and upper-cases a raw event label.
///
/// Idempotent: normalizing an already-normalized label returns it
/// unchanged.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Returns `true` for a normalized label that marks a summary row.
#[must_use]
pub fn is_summary(normalized: &str) -> bool {
    normalized.contains(SUMMARY_MARKER)
}

// ── Mapping artifact ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MappingRow {
    #[serde(rename = "originalType")]
    original: String,
    #[serde(rename = "modifiedType")]
    canonical: String,
}

/// Lookup table from normalized raw label to canonical category.
///
/// Loaded once and read-only afterwards. Keys are matched exactly
/// (case-sensitively) against [`normalize_label`] output.
#[derive(Debug, Clone, Default)]
pub struct CategoryMapping {
    entries: HashMap<String, CanonicalCategory>,
}

impl CategoryMapping {
    /// Reads a mapping artifact from a delimited file with
    /// `originalType` and `modifiedType` columns.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read, a column is
    /// missing, a `modifiedType` is outside the permitted vocabulary, or the
    /// same `originalType` maps to two different categories.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mapping = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        log::info!(
            "Loaded {} category mappings from {}",
            mapping.len(),
            path.display()
        );
        Ok(mapping)
    }

    /// Reads a mapping artifact from any reader. `label` names the source in
    /// errors.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn from_reader<R: Read>(reader: R, label: &str) -> Result<Self, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let csv_err = |e: csv::Error| SourceError::Csv {
            path: label.to_owned(),
            source: e,
        };

        let headers = csv_reader.headers().map_err(csv_err)?.clone();
        for column in [ORIGINAL_COLUMN, CANONICAL_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(SourceError::MissingColumn {
                    path: label.to_owned(),
                    column: column.to_owned(),
                });
            }
        }

        let mut entries: HashMap<String, CanonicalCategory> = HashMap::new();
        for record in csv_reader.records() {
            let record = record.map_err(csv_err)?;
            let line = record.position().map_or(0, csv::Position::line);
            let row: MappingRow = record.deserialize(Some(&headers)).map_err(csv_err)?;
            let canonical = CanonicalCategory::from_str(&row.canonical).map_err(|source| {
                SourceError::InvalidMapping {
                    path: label.to_owned(),
                    line,
                    source,
                }
            })?;

            match entries.get(&row.original) {
                Some(existing) if *existing != canonical => {
                    return Err(SourceError::ConflictingMapping {
                        original: row.original,
                        first: existing.to_string(),
                        second: canonical.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    entries.insert(row.original, canonical);
                }
            }
        }

        Ok(Self { entries })
    }

    /// Canonical category for a normalized label.
    #[must_use]
    pub fn get(&self, normalized: &str) -> Option<CanonicalCategory> {
        self.entries.get(normalized).copied()
    }

    /// Number of distinct labels in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Errors ───────────────────────────────────────────────────────────────

/// A normalized label that the mapping has no entry for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedCategoryError {
    /// The normalized label.
    pub category: String,
}

impl std::fmt::Display for UnmappedCategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "event category '{}' has no entry in the category mapping",
            self.category
        )
    }
}

impl std::error::Error for UnmappedCategoryError {}

/// Errors that abort normalization of a record stream.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The upstream loader failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A label is missing from the mapping under [`UnmappedPolicy::Fail`].
    #[error(transparent)]
    Unmapped(#[from] UnmappedCategoryError),
}

// ── Normalizer ───────────────────────────────────────────────────────────

/// Rows dropped (or kept) during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeStats {
    /// Rows whose label marks a summary.
    pub summary_dropped: u64,
    /// Rows mapped to the unclassifiable sentinel.
    pub unclassifiable_dropped: u64,
    /// Rows skipped because their label was unmapped (skip policy only).
    pub unmapped_skipped: u64,
    /// Rows that became [`CanonicalEventRecord`]s.
    pub canonical: u64,
}

/// Applies label normalization and the mapping to raw records, one at a
/// time, keeping drop counts.
pub struct CategoryNormalizer<'a> {
    mapping: &'a CategoryMapping,
    policy: UnmappedPolicy,
    stats: NormalizeStats,
    reported: HashSet<String>,
}

impl<'a> CategoryNormalizer<'a> {
    /// Creates a normalizer with the default [`UnmappedPolicy::Fail`].
    #[must_use]
    pub fn new(mapping: &'a CategoryMapping) -> Self {
        Self {
            mapping,
            policy: UnmappedPolicy::default(),
            stats: NormalizeStats::default(),
            reported: HashSet::new(),
        }
    }

    /// Sets how unmapped labels are handled.
    #[must_use]
    pub fn with_policy(mut self, policy: UnmappedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Counts so far.
    #[must_use]
    pub const fn stats(&self) -> NormalizeStats {
        self.stats
    }

    /// Normalizes one record. Returns `Ok(None)` when the record is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedCategoryError`] if the label has no mapping entry
    /// and the policy is [`UnmappedPolicy::Fail`].
    pub fn normalize_record(
        &mut self,
        record: RawEventRecord,
    ) -> Result<Option<CanonicalEventRecord>, UnmappedCategoryError> {
        let category = normalize_label(&record.category);

        if is_summary(&category) {
            self.stats.summary_dropped += 1;
            return Ok(None);
        }

        let Some(canonical) = self.mapping.get(&category) else {
            return match self.policy {
                UnmappedPolicy::Fail => Err(UnmappedCategoryError { category }),
                UnmappedPolicy::Skip => {
                    self.stats.unmapped_skipped += 1;
                    if !self.reported.contains(&category) {
                        log::warn!("Skipping rows with unmapped event category '{category}'");
                        self.reported.insert(category);
                    }
                    Ok(None)
                }
            };
        };

        let Some(event_type) = canonical.event_type() else {
            self.stats.unclassifiable_dropped += 1;
            return Ok(None);
        };

        self.stats.canonical += 1;
        Ok(Some(CanonicalEventRecord {
            record: RawEventRecord { category, ..record },
            canonical_category: event_type,
        }))
    }

    /// Normalizes a loader stream, stopping at the first load or mapping
    /// error. Surviving records keep their input order.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the stream yields an error or a label
    /// is unmapped under [`UnmappedPolicy::Fail`].
    pub fn normalize_all<I>(&mut self, records: I) -> Result<Vec<CanonicalEventRecord>, NormalizeError>
    where
        I: IntoIterator<Item = Result<RawEventRecord, SourceError>>,
    {
        let mut out = Vec::new();
        for record in records {
            if let Some(canonical) = self.normalize_record(record?)? {
                out.push(canonical);
            }
        }

        log::info!(
            "Normalized {} records ({} summary, {} unclassifiable, {} unmapped dropped)",
            self.stats.canonical,
            self.stats.summary_dropped,
            self.stats.unclassifiable_dropped,
            self.stats.unmapped_skipped
        );
        Ok(out)
    }
}

/// Normalizes `records` against `mapping`, failing on the first unmapped
/// label. Surviving records keep their input order; nothing is
/// deduplicated.
///
/// # Errors
///
/// Returns [`UnmappedCategoryError`] naming the first label with no mapping
/// entry.
pub fn normalize<I>(
    records: I,
    mapping: &CategoryMapping,
) -> Result<Vec<CanonicalEventRecord>, UnmappedCategoryError>
where
    I: IntoIterator<Item = RawEventRecord>,
{
    let mut normalizer = CategoryNormalizer::new(mapping);
    let mut out = Vec::new();
    for record in records {
        if let Some(canonical) = normalizer.normalize_record(record)? {
            out.push(canonical);
        }
    }
    Ok(out)
}

// ── Mapping gaps ─────────────────────────────────────────────────────────

/// A normalized label that appears in the data but not in the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingGap {
    /// The normalized label.
    pub category: String,
    /// Number of rows carrying it.
    pub rows: u64,
}

/// Lists every non-summary label in `records` that `mapping` cannot
/// resolve, most frequent first, ties by label.
///
/// # Errors
///
/// Returns [`SourceError`] if the record stream fails.
pub fn find_mapping_gaps<I>(
    records: I,
    mapping: &CategoryMapping,
) -> Result<Vec<MappingGap>, SourceError>
where
    I: IntoIterator<Item = Result<RawEventRecord, SourceError>>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        let category = normalize_label(&record?.category);
        if is_summary(&category) || mapping.get(&category).is_some() {
            continue;
        }
        *counts.entry(category).or_default() += 1;
    }

    let mut gaps: Vec<MappingGap> = counts
        .into_iter()
        .map(|(category, rows)| MappingGap { category, rows })
        .collect();
    gaps.sort_by(|a, b| b.rows.cmp(&a.rows).then_with(|| a.category.cmp(&b.category)));
    Ok(gaps)
}

/// Every canonical label the mapping may use, for documentation and
/// prompts.
#[must_use]
pub fn permitted_labels() -> Vec<String> {
    EventType::all()
        .into_iter()
        .map(|event_type| event_type.to_string())
        .chain(std::iter::once(CanonicalCategory::Unclassifiable.to_string()))
        .collect()
}
