//! Shared helpers for reading typed columns out of a `DataFrame`.

use crate::error::{ImputationError, Result};
use polars::prelude::*;

// =============================================================================
// Schema Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check whether the schema defines a column.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Return the first of `candidates` that the schema defines.
///
/// # Example
///
/// ```rust,ignore
/// let species = first_available_column(&df, &["Scientific Name", "Full Name"]);
/// ```
pub fn first_available_column<'a, S: AsRef<str>>(
    df: &DataFrame,
    candidates: &'a [S],
) -> Option<&'a str> {
    candidates
        .iter()
        .map(|s| s.as_ref())
        .find(|name| has_column(df, name))
}

/// Fail with a schema error unless `name` is defined and numeric.
pub fn require_numeric_column(df: &DataFrame, name: &str) -> Result<()> {
    let column = df
        .column(name)
        .map_err(|_| ImputationError::ColumnNotFound(name.to_string()))?;

    if !is_numeric_dtype(column.dtype()) {
        return Err(ImputationError::InvalidColumnType {
            column: name.to_string(),
            expected: "numeric".to_string(),
            found: column.dtype().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Read a numeric column as `f64`, mapping both null and NaN to `None`.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    require_numeric_column(df, name)?;
    let column = df.column(name)?;
    let as_float = column.cast(&DataType::Float64)?;
    let values = as_float.f64()?;

    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Read a column as strings; null stays `None`. Any dtype castable to string works.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| ImputationError::ColumnNotFound(name.to_string()))?;
    let as_str = column.cast(&DataType::String)?;
    let values = as_str.str()?;

    Ok(values
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Pick a column name derived from `base` that the schema does not use yet.
pub fn unused_column_name(df: &DataFrame, base: &str) -> String {
    if !has_column(df, base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}_{}", base, i))
        .find(|candidate| !has_column(df, candidate))
        .unwrap_or_else(|| base.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_first_available_column_respects_priority() {
        let df = df![
            "Full Name" => ["Maple, Norway"],
            "Scientific Name" => ["Acer platanoides"],
        ]
        .unwrap();

        assert_eq!(
            first_available_column(&df, &["Scientific Name", "Full Name"]),
            Some("Scientific Name")
        );
        assert_eq!(
            first_available_column(&df, &["Botanical", "Full Name"]),
            Some("Full Name")
        );
        assert_eq!(first_available_column(&df, &["Botanical"]), None);
    }

    #[test]
    fn test_require_numeric_column() {
        let df = df![
            "DBH" => [10.0, 12.0],
            "Species" => ["Oak", "Elm"],
        ]
        .unwrap();

        assert!(require_numeric_column(&df, "DBH").is_ok());
        assert!(matches!(
            require_numeric_column(&df, "Species"),
            Err(ImputationError::InvalidColumnType { .. })
        ));
        assert!(matches!(
            require_numeric_column(&df, "Height"),
            Err(ImputationError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_numeric_values_treats_nan_as_missing() {
        let df = df![
            "Height" => [Some(20.0), None, Some(f64::NAN)],
        ]
        .unwrap();

        let values = numeric_values(&df, "Height").unwrap();
        assert_eq!(values, vec![Some(20.0), None, None]);
    }

    #[test]
    fn test_numeric_values_casts_integers() {
        let df = df![
            "DBH" => [Some(10i64), None, Some(8i64)],
        ]
        .unwrap();

        let values = numeric_values(&df, "DBH").unwrap();
        assert_eq!(values, vec![Some(10.0), None, Some(8.0)]);
    }

    #[test]
    fn test_string_values() {
        let df = df![
            "Species" => [Some("Oak"), None],
        ]
        .unwrap();

        let values = string_values(&df, "Species").unwrap();
        assert_eq!(values, vec![Some("Oak".to_string()), None]);
    }

    #[test]
    fn test_unused_column_name() {
        let df = df![
            "species_oak" => [1.0],
            "species_oak_1" => [1.0],
        ]
        .unwrap();

        assert_eq!(unused_column_name(&df, "species_elm"), "species_elm");
        assert_eq!(unused_column_name(&df, "species_oak"), "species_oak_2");
    }
}
