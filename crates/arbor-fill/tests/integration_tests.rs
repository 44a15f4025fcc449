//! Integration tests for the imputation cascade.
//!
//! These tests run the loader and the cascade end to end over small
//! inventory fixtures.

use arbor_fill::{
    CascadeImputer, ImputationConfig, ImputationError, SkipReason, SpeciesEncoding, io,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    io::load_inventory(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn cascade(encoding: SpeciesEncoding) -> CascadeImputer {
    let config = ImputationConfig::builder()
        .species_encoding(encoding)
        .build()
        .unwrap();
    CascadeImputer::new(config).unwrap()
}

// ============================================================================
// Fixture Tests
// ============================================================================

#[test]
fn test_loader_prepares_fixture() {
    let df = load_fixture("trees_small.csv");

    assert_eq!(df.height(), 10);
    assert!(df.column("Scientific Name").is_ok());
    assert!(df.column("Full Name").is_ok());
    // Zero height and crown width are treated as missing
    assert_eq!(floats(&df, "Height")[9], None);
    assert_eq!(floats(&df, "Crown Width")[9], None);
}

#[test]
fn test_cascade_on_fixture() {
    let df = load_fixture("trees_small.csv");
    let result = CascadeImputer::default().impute(&df).unwrap();

    assert_eq!(result.report.species_column, "Scientific Name");
    assert_eq!(result.report.species_count, 3);

    let height = result.report.stage("Height").unwrap();
    assert_eq!(
        (height.trainable, height.predictable, height.unresolvable),
        (5, 3, 2)
    );
    assert_eq!(height.neighbors, Some(5));

    let width = result.report.stage("Crown Width").unwrap();
    assert_eq!(
        (width.trainable, width.predictable, width.unresolvable),
        (5, 3, 2)
    );

    // Row 8 lacks DBH and row 9 lacks species: both stay missing
    let heights = floats(&result.data, "Height");
    let widths = floats(&result.data, "Crown Width");
    for row in [7, 8] {
        assert_eq!(heights[row], None);
        assert_eq!(widths[row], None);
    }
    for row in [0, 1, 2, 3, 4, 5, 6, 9] {
        assert!(heights[row].is_some(), "height missing in row {}", row);
        assert!(widths[row].is_some(), "crown width missing in row {}", row);
    }
}

#[test]
fn test_cascade_preserves_order_and_schema() {
    let df = load_fixture("trees_small.csv");
    let result = CascadeImputer::default().impute(&df).unwrap();

    assert_eq!(result.data.height(), df.height());
    assert_eq!(result.data.get_column_names(), df.get_column_names());
    for name in ["Site ID", "Address", "Species", "DBH", "Scientific Name"] {
        let before = df.column(name).unwrap().as_materialized_series();
        let after = result.data.column(name).unwrap().as_materialized_series();
        assert!(after.equals_missing(before), "column '{}' changed", name);
    }
}

#[test]
fn test_cascade_never_overwrites_observed_values() {
    let df = load_fixture("trees_small.csv");

    for encoding in [SpeciesEncoding::OneHot, SpeciesEncoding::Ordinal] {
        let result = cascade(encoding).impute(&df).unwrap();

        for name in ["Height", "Crown Width"] {
            let before = floats(&df, name);
            let after = floats(&result.data, name);
            for (row, value) in before.iter().enumerate() {
                if value.is_some() {
                    assert_eq!(after[row], *value, "{} changed in row {}", name, row);
                }
            }
        }
    }
}

#[test]
fn test_cascade_is_idempotent() {
    let df = load_fixture("trees_small.csv");
    let imputer = CascadeImputer::default();

    let first = imputer.impute(&df).unwrap();
    let second = imputer.impute(&first.data).unwrap();

    assert!(second.data.equals_missing(&first.data));
    assert_eq!(second.report.total_imputed(), 0);
}

#[test]
fn test_cascade_on_complete_dataset_is_noop() {
    let df = load_fixture("complete.csv");
    let result = CascadeImputer::default().impute(&df).unwrap();

    assert!(result.data.equals_missing(&df));
    for stage in &result.report.stages {
        assert_eq!(stage.skipped, Some(SkipReason::NothingToImpute));
    }
}

#[test]
fn test_cascade_without_species_column_fails() {
    let df = load_fixture("no_species.csv");
    let err = CascadeImputer::default().impute(&df).unwrap_err();

    assert!(err.is_schema_error());
    assert!(matches!(err, ImputationError::SpeciesColumnNotFound { .. }));
}

#[test]
fn test_filled_inventory_roundtrips_through_csv() {
    let df = load_fixture("trees_small.csv");
    let mut result = CascadeImputer::default().impute(&df).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trees_filled.csv");
    io::write_inventory(&mut result.data, &path).unwrap();

    let reloaded = io::load_inventory(&path).unwrap();
    assert_eq!(reloaded.height(), 10);
    assert_eq!(reloaded.column("Height").unwrap().null_count(), 2);
    assert_eq!(reloaded.column("Crown Width").unwrap().null_count(), 2);
}

// ============================================================================
// In-Memory Scenarios
// ============================================================================

#[test]
fn test_single_species_example() {
    let df = df![
        "DBH" => [10.0, 12.0, 8.0, 15.0, 9.0],
        "Scientific Name" => ["Oak", "Oak", "Oak", "Oak", "Oak"],
        "Height" => [Some(20.0), None, Some(18.0), None, Some(19.0)],
        "Crown Width" => [Option::<f64>::None, None, None, None, None],
    ]
    .unwrap();

    let result = CascadeImputer::default().impute(&df).unwrap();
    let heights = floats(&result.data, "Height");

    assert!(heights.iter().all(Option::is_some));
    // Imputed heights stay within the observed range of the oak-only model
    for row in [1, 3] {
        let h = heights[row].unwrap();
        assert!((18.0..=20.0).contains(&h), "row {} height {}", row, h);
    }

    // No crown width was ever observed, so there is nothing to train on
    let width = result.report.stage("Crown Width").unwrap();
    assert_eq!(width.skipped, Some(SkipReason::NoTrainingRows));
    assert_eq!(width.unresolvable, 0);
    assert_eq!(width.predictable, 5);
    assert_eq!(result.data.column("Crown Width").unwrap().null_count(), 5);
}

#[test]
fn test_single_species_example_with_one_observed_crown_width() {
    let df = df![
        "DBH" => [10.0, 12.0, 8.0, 15.0, 9.0],
        "Scientific Name" => ["Oak", "Oak", "Oak", "Oak", "Oak"],
        "Height" => [Some(20.0), None, Some(18.0), None, Some(19.0)],
        "Crown Width" => [Some(12.0), None, None, None, None],
    ]
    .unwrap();

    let result = CascadeImputer::default().impute(&df).unwrap();
    assert_eq!(result.data.column("Height").unwrap().null_count(), 0);
    assert_eq!(result.data.column("Crown Width").unwrap().null_count(), 0);
}

#[test]
fn test_species_separates_neighborhoods() {
    // Same diameters, different species: one-hot distance keeps heights apart
    let df = df![
        "DBH" => [10.0, 10.0, 10.0, 10.0],
        "Full Name" => ["Oak", "Oak", "Linden", "Linden"],
        "Height" => [Some(50.0), None, Some(20.0), None],
    ]
    .unwrap();

    let config = ImputationConfig::builder().min_neighbors(1).build().unwrap();
    let result = CascadeImputer::new(config).unwrap().impute(&df).unwrap();
    let heights = floats(&result.data, "Height");

    assert_eq!(heights[1], Some(50.0));
    assert_eq!(heights[3], Some(20.0));
}

#[test]
fn test_large_training_set_caps_neighborhood() {
    let n = 900;
    let dbh: Vec<f64> = (0..=n).map(|i| i as f64).collect();
    let height: Vec<Option<f64>> = (0..=n)
        .map(|i| if i == n { None } else { Some(i as f64 * 2.0) })
        .collect();
    let species: Vec<&str> = vec!["Oak"; n + 1];

    let df = DataFrame::new(vec![
        Series::new("DBH".into(), dbh).into(),
        Series::new("Scientific Name".into(), species).into(),
        Series::new("Height".into(), height).into(),
    ])
    .unwrap();

    let result = CascadeImputer::default().impute(&df).unwrap();
    let stage = result.report.stage("Height").unwrap();
    assert_eq!(stage.trainable, 900);
    assert_eq!(stage.neighbors, Some(30));
}

#[test]
fn test_report_serializes_to_json() {
    let df = load_fixture("trees_small.csv");
    let result = CascadeImputer::default().impute(&df).unwrap();

    let json = serde_json::to_value(&result.report).unwrap();
    assert_eq!(json["encoding"], "one_hot");
    assert_eq!(json["stages"][0]["target"], "Height");
    assert_eq!(json["stages"][1]["target"], "Crown Width");
}
