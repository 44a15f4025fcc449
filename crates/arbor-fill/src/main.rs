//! CLI entry point for the tree inventory imputation cascade.

use anyhow::{Result, anyhow};
use arbor_fill::{CascadeImputer, CascadeReport, ImputationConfig, SpeciesEncoding, io};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible species encoding enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSpeciesEncoding {
    /// One indicator column per species
    OneHot,
    /// A single ordinal code column
    Ordinal,
}

impl From<CliSpeciesEncoding> for SpeciesEncoding {
    fn from(cli: CliSpeciesEncoding) -> Self {
        match cli {
            CliSpeciesEncoding::OneHot => SpeciesEncoding::OneHot,
            CliSpeciesEncoding::Ordinal => SpeciesEncoding::Ordinal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fill missing tree height and crown width in a tree inventory",
    long_about = "Imputes missing Height from DBH and species, then missing Crown Width \
                  from DBH, Height and species, using distance-weighted nearest neighbors.\n\n\
                  EXAMPLES:\n  \
                  # Fill gaps and write trees_filled.csv next to the input\n  \
                  arbor-fill -i trees.csv\n\n  \
                  # Smaller neighborhoods with ordinal species codes\n  \
                  arbor-fill -i trees.csv --min-neighbors 1 --encoding ordinal\n\n  \
                  # Machine-readable report\n  \
                  arbor-fill -i trees.csv --json | jq .stages"
)]
struct Args {
    /// Path to the inventory CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path
    ///
    /// Defaults to <input_stem>_filled.csv next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Lower bound for the neighborhood size
    #[arg(long, default_value = "5")]
    min_neighbors: usize,

    /// Upper bound for the neighborhood size
    #[arg(long, default_value = "30")]
    max_neighbors: usize,

    /// How species labels are turned into features
    #[arg(long, value_enum, default_value = "one-hot")]
    encoding: CliSpeciesEncoding,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the report as JSON to stdout instead of a summary
    ///
    /// Disables all logging so stdout only carries the JSON.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to <output_stem>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = ImputationConfig::builder()
        .min_neighbors(args.min_neighbors)
        .max_neighbors(args.max_neighbors)
        .species_encoding(args.encoding.into())
        .build()?;

    let inventory = io::load_inventory(&args.input)?;
    info!("Inventory loaded: {:?}", inventory.shape());

    let imputer = CascadeImputer::new(config)?;
    let mut result = match imputer.impute(&inventory) {
        Ok(result) => result,
        Err(e) => {
            error!("Imputation failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow!("Imputation failed: {}", e));
        }
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    io::write_inventory(&mut result.data, &output)?;

    if args.emit_report {
        let report_path = sibling_path(&output, "_report.json");
        std::fs::write(&report_path, serde_json::to_string_pretty(&result.report)?)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    print_summary(&result.report, &args.input, &output);
    Ok(())
}

/// `<dir>/<stem>_filled.csv` for an input `<dir>/<stem>.csv`.
fn default_output_path(input: &Path) -> PathBuf {
    sibling_path(input, "_filled.csv")
}

/// Replace the file name of `path` with its stem plus `suffix`.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("inventory");
    path.with_file_name(format!("{}{}", stem, suffix))
}

/// Print a human-readable summary of the imputation.
///
/// Uses `println!` on purpose: this is the command's output, not a log line.
fn print_summary(report: &CascadeReport, input: &Path, output: &Path) {
    println!();
    println!("{}", "=".repeat(60));
    println!("IMPUTATION COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Input:   {} ({} rows)", input.display(), report.rows);
    println!("Output:  {}", output.display());
    println!(
        "Species: '{}' ({} distinct, {} encoding)",
        report.species_column,
        report.species_count,
        report.encoding.display_name()
    );
    println!();

    println!(
        "{:<14} {:>10} {:>12} {:>13} {:>4} {:>9}",
        "Target", "Trainable", "Predictable", "Unresolvable", "k", "Imputed"
    );
    println!("{}", "-".repeat(60));
    for stage in &report.stages {
        match stage.skipped {
            Some(reason) if stage.trainable + stage.predictable + stage.unresolvable == 0 => {
                println!("{:<14} skipped: {}", stage.target, reason.description());
            }
            _ => {
                let k = stage
                    .neighbors
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<14} {:>10} {:>12} {:>13} {:>4} {:>9}",
                    stage.target,
                    stage.trainable,
                    stage.predictable,
                    stage.unresolvable,
                    k,
                    stage.imputed
                );
            }
        }
    }
    println!();
    println!(
        "Filled {} values in {}ms",
        report.total_imputed(),
        report.duration_ms
    );
    println!("{}", "=".repeat(60));
}
