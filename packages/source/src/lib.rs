#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storm event record loading, category normalization and damage scaling.
//!
//! A [`dataset_def::DatasetDefinition`] describes where the eight analysis
//! columns live in a source file. The [`loader`] streams
//! [`RawEventRecord`](storm_impact_source_models::RawEventRecord)s out of a
//! (possibly compressed) delimited file, [`type_mapping`] maps their
//! free-text categories onto the canonical vocabulary, and [`scaling`]
//! turns magnitude-coded damage amounts into absolute dollars.

pub mod dataset_def;
pub mod loader;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod scaling;
pub mod type_mapping;

use storm_impact_event_models::ParseCategoryError;

/// Errors that abort reading a source file or mapping artifact.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be opened or decompressed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The delimited stream could not be read.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the delimited file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// A required column is absent from the header row.
    #[error("{path} has no '{column}' column")]
    MissingColumn {
        /// Path to the delimited file.
        path: String,
        /// Name of the missing column.
        column: String,
    },

    /// A mapping row names a canonical category outside the vocabulary.
    #[error("invalid mapping at {path} line {line}: {source}")]
    InvalidMapping {
        /// Path to the mapping artifact.
        path: String,
        /// 1-based line number.
        line: u64,
        /// The rejected canonical value.
        source: ParseCategoryError,
    },

    /// The same original category is mapped to two different canonical
    /// categories.
    #[error("'{original}' is mapped to both {first} and {second}")]
    ConflictingMapping {
        /// The duplicated original category.
        original: String,
        /// Canonical category from the first entry.
        first: String,
        /// Canonical category from the conflicting entry.
        second: String,
    },

    /// A dataset definition is malformed.
    #[error("Dataset config error: {0}")]
    Config(String),
}
