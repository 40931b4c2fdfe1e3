//! Interactive prompt for the storm impact CLI.
//!
//! Provides a menu-driven interface using `dialoguer` for running an
//! analysis without memorizing CLI flags.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};
use storm_impact_analytics::AnalysisOptions;
use storm_impact_cli_utils::MultiProgress;
use storm_impact_source::dataset_def::DatasetDefinition;
use storm_impact_source::registry::all_datasets;
use storm_impact_source::type_mapping::UnmappedPolicy;
use strum::IntoEnumIterator as _;

use crate::commands;

/// Top-level actions available in the interactive menu.
enum Action {
    Analyze,
    MappingGaps,
    ListDatasets,
}

impl Action {
    const ALL: &[Self] = &[Self::Analyze, Self::MappingGaps, Self::ListDatasets];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Analyze => "Rank event types by impact",
            Self::MappingGaps => "Find unmapped categories",
            Self::ListDatasets => "List dataset definitions",
        }
    }
}

/// Runs the interactive menu, prompting for the action and its inputs.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected command fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Storm Impact");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Analyze => {
            let definition = select_dataset()?;
            let data = prompt_existing_path("Storm event file")?;
            let mapping = prompt_existing_path("Category mapping file")?;
            let options = prompt_options(&definition)?;
            let json = Confirm::new()
                .with_prompt("Print as JSON?")
                .default(false)
                .interact()?;
            commands::analyze(multi, &data, &mapping, &definition, &options, json)?;
        }
        Action::MappingGaps => {
            let definition = select_dataset()?;
            let data = prompt_existing_path("Storm event file")?;
            let mapping = prompt_existing_path("Category mapping file")?;
            commands::mapping_gaps(multi, &data, &mapping, &definition, false)?;
        }
        Action::ListDatasets => commands::list_datasets(),
    }

    Ok(())
}

/// Picks a built-in dataset definition, skipping the prompt when only one
/// exists.
fn select_dataset() -> Result<DatasetDefinition, Box<dyn std::error::Error>> {
    let mut datasets = all_datasets();
    if datasets.len() == 1 {
        return Ok(datasets.remove(0));
    }

    let labels: Vec<String> = datasets
        .iter()
        .map(|d| format!("{} \u{2014} {}", d.id(), d.name()))
        .collect();

    let idx = Select::new()
        .with_prompt("Dataset layout")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(datasets.swap_remove(idx))
}

fn prompt_existing_path(prompt: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input.trim()).is_file() {
                Ok(())
            } else {
                Err(format!("{input} is not a file"))
            }
        })
        .interact_text()?;
    Ok(PathBuf::from(input.trim()))
}

/// Prompts for the analysis knobs, defaulting to the dataset's settings.
fn prompt_options(
    definition: &DatasetDefinition,
) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
    let defaults = AnalysisOptions::from(&definition.analysis);

    let top_n: usize = Input::new()
        .with_prompt("Event types per ranking")
        .default(defaults.top_n)
        .interact_text()?;

    let policies: Vec<UnmappedPolicy> = UnmappedPolicy::iter().collect();
    let policy_labels: Vec<String> = policies
        .iter()
        .map(|p| match p {
            UnmappedPolicy::Fail => "fail \u{2014} stop at the first unmapped category".to_owned(),
            UnmappedPolicy::Skip => "skip \u{2014} drop unmapped rows and warn".to_owned(),
        })
        .collect();
    let default_policy = policies
        .iter()
        .position(|p| *p == defaults.unmapped)
        .unwrap_or(0);
    let policy_idx = Select::new()
        .with_prompt("Unmapped categories")
        .items(&policy_labels)
        .default(default_policy)
        .interact()?;

    let since: String = Input::new()
        .with_prompt("Earliest year (empty for all)")
        .default(
            defaults
                .since_year
                .map_or_else(String::new, |year| year.to_string()),
        )
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() || input.trim().parse::<i32>().is_ok() {
                Ok(())
            } else {
                Err(format!("{input} is not a year"))
            }
        })
        .interact_text()?;
    let since_year = match since.trim() {
        "" => None,
        year => Some(year.parse::<i32>()?),
    };

    Ok(AnalysisOptions {
        top_n,
        unmapped: policies[policy_idx],
        since_year,
    })
}
