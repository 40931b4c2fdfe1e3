#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for storm impact analysis.
//!
//! Ranks storm event types by population-health impact (fatalities plus
//! injuries) and economic impact (property plus crop damage) from a NOAA
//! Storm Database extract and a category mapping file. Running without a
//! subcommand starts an interactive prompt.
//!
//! Uses `indicatif-log-bridge` (via [`storm_impact_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the row counter never fight for the terminal.

mod commands;
mod interactive;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use storm_impact_source::type_mapping::UnmappedPolicy;

#[derive(Parser)]
#[command(
    name = "storm_impact",
    about = "Rank storm event types by health and economic impact"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where to read events and the category mapping from.
#[derive(Args)]
struct SourceArgs {
    /// Storm event file (`.csv`, `.csv.gz`, `.csv.bz2` or `.csv.zst`)
    #[arg(long)]
    data: PathBuf,
    /// Category mapping CSV with `originalType` and `modifiedType` columns
    #[arg(long)]
    mapping: PathBuf,
    /// Built-in dataset definition id (default: `noaa_storm_data`)
    #[arg(long, conflicts_with = "dataset_file")]
    dataset: Option<String>,
    /// Dataset definition TOML file, for files with a different layout
    #[arg(long)]
    dataset_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank event types by casualties and by damages
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        /// Number of event types per ranking (overrides the dataset default)
        #[arg(long)]
        top: Option<usize>,
        /// What to do with categories missing from the mapping: fail or skip
        #[arg(long, value_parser = parse_unmapped_policy)]
        unmapped: Option<UnmappedPolicy>,
        /// Only include events that began in or after this year
        #[arg(long)]
        since_year: Option<i32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories in the data that the mapping does not cover
    MappingGaps {
        #[command(flatten)]
        source: SourceArgs,
        /// Print the gaps as JSON
        #[arg(long)]
        json: bool,
    },
    /// List built-in dataset definitions
    Datasets,
}

fn parse_unmapped_policy(s: &str) -> Result<UnmappedPolicy, String> {
    s.parse()
        .map_err(|_| format!("expected 'fail' or 'skip', got '{s}'"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = storm_impact_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Analyze {
            source,
            top,
            unmapped,
            since_year,
            json,
        } => {
            let definition =
                commands::resolve_dataset(source.dataset.as_deref(), source.dataset_file.as_deref())?;
            let mut options = storm_impact_analytics::AnalysisOptions::from(&definition.analysis);
            if let Some(top) = top {
                options.top_n = top;
            }
            if let Some(unmapped) = unmapped {
                options.unmapped = unmapped;
            }
            if since_year.is_some() {
                options.since_year = since_year;
            }

            commands::analyze(
                &multi,
                &source.data,
                &source.mapping,
                &definition,
                &options,
                json,
            )?;
        }
        Commands::MappingGaps { source, json } => {
            let definition =
                commands::resolve_dataset(source.dataset.as_deref(), source.dataset_file.as_deref())?;
            commands::mapping_gaps(&multi, &source.data, &source.mapping, &definition, json)?;
        }
        Commands::Datasets => commands::list_datasets(),
    }

    Ok(())
}
