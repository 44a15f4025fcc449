use crate::config::SpeciesEncoding;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Why an imputation stage left its target untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The target column is not part of the schema.
    TargetNotInSchema,
    /// No row has both the target and every feature observed.
    NoTrainingRows,
    /// No row is missing the target while having every feature.
    NothingToImpute,
}

impl SkipReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::TargetNotInSchema => "target column not in dataset",
            Self::NoTrainingRows => "no fully observed training rows",
            Self::NothingToImpute => "no predictable rows",
        }
    }
}

/// Outcome of a single imputation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Column that was imputed.
    pub target: String,
    /// Feature columns, in the order they entered the distance computation.
    pub features: Vec<String>,
    /// Rows with the target and every feature present.
    pub trainable: usize,
    /// Rows missing only the target.
    pub predictable: usize,
    /// Rows missing the target and at least one feature.
    pub unresolvable: usize,
    /// Neighborhood size, when a model was fit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<usize>,
    /// Number of values written.
    pub imputed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl StageReport {
    pub(crate) fn skipped(target: &str, features: &[String], reason: SkipReason) -> Self {
        Self {
            target: target.to_string(),
            features: features.to_vec(),
            trainable: 0,
            predictable: 0,
            unresolvable: 0,
            neighbors: None,
            imputed: 0,
            skipped: Some(reason),
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Summary of a full cascade run.
///
/// Serialized as-is by the CLI's `--json` and `--emit-report` outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Row count (unchanged by imputation).
    pub rows: usize,
    /// Species column selected from the accepted names.
    pub species_column: String,
    pub encoding: SpeciesEncoding,
    /// Number of distinct species seen.
    pub species_count: usize,
    /// Stages in execution order: height, then crown width.
    pub stages: Vec<StageReport>,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
}

impl CascadeReport {
    /// Total values written across all stages.
    pub fn total_imputed(&self) -> usize {
        self.stages.iter().map(|s| s.imputed).sum()
    }

    /// Report for a given target column, if that stage ran or was skipped.
    pub fn stage(&self, target: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.target == target)
    }
}

/// Completed dataset plus the report describing how it was produced.
#[derive(Debug, Clone)]
pub struct CascadeResult {
    pub data: DataFrame,
    pub report: CascadeReport,
}
