//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures everything that differs between storm
//! event files: column names, delimiter, compression and the timestamp
//! format. Definitions are TOML documents, either embedded in the binary
//! (see [`crate::registry`]) or read from disk.

use std::path::Path;

use serde::Deserialize;

use crate::SourceError;
use crate::type_mapping::UnmappedPolicy;

/// Number of aggregates reported per dimension unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 10;

/// Begin-date format used by the NOAA storm database (`4/18/1950 0:00:00`).
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

// ── Top-level dataset definition ─────────────────────────────────────────

/// A complete, config-driven description of a storm event file.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"noaa_storm_data"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Field delimiter (default: comma).
    #[serde(default)]
    pub delimiter: Option<String>,
    /// How the file is compressed.
    #[serde(default)]
    pub compression: Compression,
    /// `chrono` format string for the begin-date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Source column names for each analysis field.
    pub columns: ColumnMapping,
    /// Analysis defaults for this dataset.
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_owned()
}

/// Compression applied to a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Infer from the file extension.
    #[default]
    Auto,
    /// Plain text.
    None,
    /// gzip (`.gz`).
    Gzip,
    /// bzip2 (`.bz2`).
    Bzip2,
    /// Zstandard (`.zst`).
    Zstd,
}

impl Compression {
    /// Resolves [`Self::Auto`] against the file extension. Other variants
    /// are returned unchanged.
    #[must_use]
    pub fn resolve(self, path: &Path) -> Self {
        if self != Self::Auto {
            return self;
        }
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gz" | "gzip") => Self::Gzip,
            Some("bz2") => Self::Bzip2,
            Some("zst" | "zstd") => Self::Zstd,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Zstd => "zstd",
        };
        f.write_str(name)
    }
}

// ── Column mapping ───────────────────────────────────────────────────────

/// Maps source column names to the eight analysis fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    /// Free-text event category.
    pub category: String,
    /// Begin date of the event.
    pub occurred_at: String,
    /// Fatality count.
    pub fatalities: String,
    /// Injury count.
    pub injuries: String,
    /// Property damage amount.
    pub property_damage: String,
    /// Property damage unit suffix.
    pub property_damage_unit: String,
    /// Crop damage amount.
    pub crop_damage: String,
    /// Crop damage unit suffix.
    pub crop_damage_unit: String,
}

impl ColumnMapping {
    /// Column names in projection order.
    #[must_use]
    pub fn names(&self) -> [&str; 8] {
        [
            self.category.as_str(),
            self.occurred_at.as_str(),
            self.fatalities.as_str(),
            self.injuries.as_str(),
            self.property_damage.as_str(),
            self.property_damage_unit.as_str(),
            self.crop_damage.as_str(),
            self.crop_damage_unit.as_str(),
        ]
    }
}

// ── Analysis settings ────────────────────────────────────────────────────

/// Per-dataset analysis defaults. Every value can be overridden from the
/// command line.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Number of aggregates to report per dimension.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// What to do with a category that has no mapping entry.
    #[serde(default)]
    pub unmapped: UnmappedPolicy,
    /// Only keep events that began in or after this year.
    #[serde(default)]
    pub since_year: Option<i32>,
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            unmapped: UnmappedPolicy::default(),
            since_year: None,
        }
    }
}

impl DatasetDefinition {
    /// Returns the unique dataset identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the delimiter as a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the configured delimiter is not
    /// exactly one byte long.
    pub fn delimiter_byte(&self) -> Result<u8, SourceError> {
        match self.delimiter.as_deref() {
            None => Ok(b','),
            Some(delim) => match delim.as_bytes() {
                [byte] => Ok(*byte),
                _ => Err(SourceError::Config(format!(
                    "{}: delimiter must be a single byte, got '{delim}'",
                    self.id
                ))),
            },
        }
    }
}

/// Parses a [`DatasetDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    toml::de::from_str(toml_str).map_err(|e| SourceError::Config(e.to_string()))
}

/// Reads and parses a [`DatasetDefinition`] from a TOML file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or parsed.
pub fn load_dataset_file(path: &Path) -> Result<DatasetDefinition, SourceError> {
    let contents = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_dataset_toml(&contents)
}
