//! Command implementations shared by the flag-driven and interactive
//! entry points.

use std::path::Path;
use std::time::Instant;

use storm_impact_analytics::{AnalysisOptions, analyze_file};
use storm_impact_cli_utils::{IndicatifProgress, MultiProgress};
use storm_impact_source::dataset_def::{DatasetDefinition, load_dataset_file};
use storm_impact_source::loader::RecordLoader;
use storm_impact_source::registry::{all_datasets, default_dataset, find_dataset};
use storm_impact_source::type_mapping::{CategoryMapping, find_mapping_gaps};

use crate::report;

/// Picks the dataset definition from a TOML file, a built-in id, or the
/// default, in that order.
///
/// # Errors
///
/// Returns an error if the TOML file cannot be loaded or the id is not a
/// built-in dataset.
pub fn resolve_dataset(
    id: Option<&str>,
    file: Option<&Path>,
) -> Result<DatasetDefinition, Box<dyn std::error::Error>> {
    if let Some(file) = file {
        let definition = load_dataset_file(file)?;
        log::info!(
            "Using dataset definition '{}' from {}",
            definition.id(),
            file.display()
        );
        return Ok(definition);
    }

    match id {
        Some(id) => find_dataset(id).ok_or_else(|| {
            format!("Unknown dataset '{id}'. Run `storm_impact datasets` to list them.").into()
        }),
        None => Ok(default_dataset()),
    }
}

/// Runs the full analysis and prints the report.
///
/// # Errors
///
/// Returns an error if the mapping or data cannot be read, a category is
/// unmapped under the fail policy, or JSON serialization fails.
pub fn analyze(
    multi: &MultiProgress,
    data: &Path,
    mapping: &Path,
    definition: &DatasetDefinition,
    options: &AnalysisOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mapping = CategoryMapping::load(mapping)?;
    let progress = IndicatifProgress::rows_spinner(multi, "Reading");

    let report = analyze_file(data, definition, &mapping, options, progress)?;
    log::info!(
        "Analysis finished in {:.1}s",
        start.elapsed().as_secs_f64()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_report(&report));
    }

    Ok(())
}

/// Lists data categories the mapping cannot resolve.
///
/// # Errors
///
/// Returns an error if the mapping or data cannot be read or JSON
/// serialization fails.
pub fn mapping_gaps(
    multi: &MultiProgress,
    data: &Path,
    mapping: &Path,
    definition: &DatasetDefinition,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = CategoryMapping::load(mapping)?;
    let progress = IndicatifProgress::rows_spinner(multi, "Reading");
    let mut records = RecordLoader::new(definition)
        .with_progress(progress)
        .open(data)?;

    let gaps = find_mapping_gaps(&mut records, &mapping)?;
    if gaps.is_empty() {
        log::info!("Every category in {} is mapped", data.display());
    } else {
        log::warn!("{} categories have no mapping entry", gaps.len());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&gaps)?);
    } else {
        print!("{}", report::render_gaps(&gaps));
    }

    Ok(())
}

/// Prints the built-in dataset definitions.
pub fn list_datasets() {
    let datasets = all_datasets();
    println!("{:<20} {:<12} NAME", "ID", "COMPRESSION");
    println!("{}", "-".repeat(60));
    for dataset in &datasets {
        println!(
            "{:<20} {:<12} {}",
            dataset.id(),
            dataset.compression.to_string(),
            dataset.name()
        );
    }
}
