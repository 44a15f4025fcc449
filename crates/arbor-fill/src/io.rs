//! Loading and writing tree-inventory CSV files.
//!
//! The loader hands the cascade a typed dataset: species labels split into
//! their name parts and measurement columns coerced to `Float64`, with
//! non-positive heights and crown widths treated as missing.

use crate::error::{Result, ResultExt};
use crate::schema::{ABBREVIATION, CROWN_WIDTH, DBH, FULL_NAME, HEIGHT, SCIENTIFIC_NAME, SPECIES};
use crate::utils::{has_column, string_values};
use once_cell::sync::Lazy;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `Common, Name (ABBR) (Scientific name)` as exported by the inventory system.
static SPECIES_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<full_name>.*?)\s*\((?P<abbreviation>.*?)\)\s*\((?P<scientific_name>.*?)\)$")
        .expect("Invalid regex: species label")
});

/// Parts of a combined species label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesName {
    pub full_name: String,
    pub abbreviation: String,
    pub scientific_name: String,
}

/// Split a combined species label. `None` when the label has no
/// abbreviation and scientific-name groups.
pub fn split_species_label(label: &str) -> Option<SpeciesName> {
    let caps = SPECIES_PATTERN.captures(label)?;
    Some(SpeciesName {
        full_name: caps["full_name"]
            .trim_matches(|c: char| c == ',' || c == ' ')
            .to_string(),
        abbreviation: caps["abbreviation"].to_string(),
        scientific_name: caps["scientific_name"].to_string(),
    })
}

/// Read an inventory CSV and prepare it for imputation.
pub fn load_inventory(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading inventory from: {}", path.display());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Opening '{}'", path.display()))?
        .finish()
        .context(format!("Reading '{}'", path.display()))?;

    debug!("Read {:?} from {}", df.shape(), path.display());
    prepare_inventory(df)
}

/// Derive species name columns and coerce measurement columns.
pub fn prepare_inventory(df: DataFrame) -> Result<DataFrame> {
    let mut df = derive_species_columns(df)?;

    for name in [DBH, HEIGHT, CROWN_WIDTH] {
        if !has_column(&df, name) {
            continue;
        }
        let positive_only = name != DBH;
        let coerced = coerce_measurement(&df, name, positive_only)?;
        df.replace(name, coerced)?;
    }

    Ok(df)
}

/// Add `Full Name`, `Abbreviation` and `Scientific Name` from `Species`
/// unless the dataset already carries them.
fn derive_species_columns(mut df: DataFrame) -> Result<DataFrame> {
    let derived = [FULL_NAME, ABBREVIATION, SCIENTIFIC_NAME];
    if !has_column(&df, SPECIES) || derived.iter().any(|name| has_column(&df, name)) {
        return Ok(df);
    }

    let parts: Vec<Option<SpeciesName>> = string_values(&df, SPECIES)?
        .iter()
        .map(|label| label.as_deref().and_then(split_species_label))
        .collect();

    let unmatched = parts.iter().filter(|p| p.is_none()).count();
    if unmatched > 0 {
        debug!("{} species labels did not match the expected pattern", unmatched);
    }

    df.with_column(Series::new(
        FULL_NAME.into(),
        name_part(&parts, |n| n.full_name.as_str()),
    ))?;
    df.with_column(Series::new(
        ABBREVIATION.into(),
        name_part(&parts, |n| n.abbreviation.as_str()),
    ))?;
    df.with_column(Series::new(
        SCIENTIFIC_NAME.into(),
        name_part(&parts, |n| n.scientific_name.as_str()),
    ))?;

    Ok(df)
}

fn name_part(
    parts: &[Option<SpeciesName>],
    pick: impl Fn(&SpeciesName) -> &str,
) -> Vec<Option<String>> {
    parts
        .iter()
        .map(|p| p.as_ref().map(|name| pick(name).to_string()))
        .collect()
}

/// Parse one measurement column to `Float64`; unparseable or non-finite values become null.
fn coerce_measurement(df: &DataFrame, name: &str, positive_only: bool) -> Result<Series> {
    let column = df.column(name)?;

    let values: Vec<Option<f64>> = if column.dtype() == &DataType::String {
        column
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_measurement))
            .collect()
    } else {
        column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .collect()
    };

    let values = values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite() && (!positive_only || *x > 0.0)))
        .collect::<Vec<_>>();

    Ok(Series::new(name.into(), values))
}

fn parse_measurement(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Write a dataset as CSV with a header row, creating parent directories.
pub fn write_inventory(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
        .context(format!("Writing '{}'", path.display()))?;

    info!("Inventory saved: {}", path.display());
    Ok(())
}
