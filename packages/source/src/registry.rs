//! Dataset registry — loads the built-in dataset definitions from embedded
//! TOML configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`]. Adding a new dataset layout is as
//! simple as creating a new TOML file and adding it to the list below.

use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[(
    "noaa_storm_data",
    include_str!("../datasets/noaa_storm_data.toml"),
)];

/// Identifier of the dataset used when none is specified.
pub const DEFAULT_DATASET_ID: &str = "noaa_storm_data";

/// Returns all built-in dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a built-in dataset definition by id.
#[must_use]
pub fn find_dataset(id: &str) -> Option<DatasetDefinition> {
    all_datasets().into_iter().find(|def| def.id() == id)
}

/// Returns the default built-in dataset definition.
///
/// # Panics
///
/// Panics if [`DEFAULT_DATASET_ID`] is not registered.
#[must_use]
pub fn default_dataset() -> DatasetDefinition {
    find_dataset(DEFAULT_DATASET_ID)
        .unwrap_or_else(|| panic!("{DEFAULT_DATASET_ID} is not a registered dataset"))
}
