use crate::config::ImputationConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::knn::{KNNRegressor, neighborhood_size};
use crate::types::{SkipReason, StageReport};
use crate::utils::{has_column, numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Class of a row relative to one (target, feature set) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// Target and all features present.
    Trainable,
    /// Target absent, all features present.
    Predictable,
    /// Target absent, at least one feature absent.
    Unresolvable,
    /// Target present, at least one feature absent. Neither used nor touched.
    Observed,
}

/// Per-row classification for a single imputation call.
#[derive(Debug, Clone)]
pub struct RowPartition {
    classes: Vec<RowClass>,
}

impl RowPartition {
    /// Classify every row. `features` is column-major: one vector per feature.
    pub fn classify(target: &[Option<f64>], features: &[Vec<Option<f64>>]) -> Self {
        let classes = target
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let complete = features.iter().all(|column| column[row].is_some());
                match (value.is_some(), complete) {
                    (true, true) => RowClass::Trainable,
                    (true, false) => RowClass::Observed,
                    (false, true) => RowClass::Predictable,
                    (false, false) => RowClass::Unresolvable,
                }
            })
            .collect();

        Self { classes }
    }

    pub fn class(&self, row: usize) -> RowClass {
        self.classes[row]
    }

    /// Row indices of the given class, in row order.
    pub fn rows(&self, class: RowClass) -> Vec<usize> {
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == class)
            .map(|(row, _)| row)
            .collect()
    }

    pub fn count(&self, class: RowClass) -> usize {
        self.classes.iter().filter(|c| **c == class).count()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Fills one target column with distance-weighted KNN predictions.
///
/// Only rows where every feature is present take part. Rows that already
/// have a target value are never modified.
#[derive(Debug, Clone, Copy)]
pub struct TargetImputer {
    min_neighbors: usize,
    max_neighbors: usize,
}

impl TargetImputer {
    pub fn new(min_neighbors: usize, max_neighbors: usize) -> Self {
        let min_neighbors = min_neighbors.max(1);
        Self {
            min_neighbors,
            max_neighbors: max_neighbors.max(min_neighbors),
        }
    }

    pub fn from_config(config: &ImputationConfig) -> Self {
        Self::new(config.min_neighbors, config.max_neighbors)
    }

    /// Neighborhood size this imputer would use for `n_samples` training rows.
    pub fn neighbors_for(&self, n_samples: usize) -> usize {
        neighborhood_size(n_samples, self.min_neighbors, self.max_neighbors)
    }

    /// Impute `target` from `features`, returning a new dataset.
    ///
    /// A target column missing from the schema, an empty training set or an
    /// empty prediction set all return the input unchanged. A missing or
    /// non-numeric feature column is a schema error.
    pub fn impute(
        &self,
        df: &DataFrame,
        target: &str,
        features: &[String],
    ) -> Result<(DataFrame, StageReport)> {
        if !has_column(df, target) {
            debug!("Skipping '{}': not in dataset", target);
            return Ok((
                df.clone(),
                StageReport::skipped(target, features, SkipReason::TargetNotInSchema),
            ));
        }

        let target_values = numeric_values(df, target)?;
        let feature_values = features
            .iter()
            .map(|name| numeric_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        let partition = RowPartition::classify(&target_values, &feature_values);
        let trainable = partition.rows(RowClass::Trainable);
        let predictable = partition.rows(RowClass::Predictable);

        let mut report = StageReport {
            target: target.to_string(),
            features: features.to_vec(),
            trainable: trainable.len(),
            predictable: predictable.len(),
            unresolvable: partition.count(RowClass::Unresolvable),
            neighbors: None,
            imputed: 0,
            skipped: None,
        };

        debug!(
            "Partitioned '{}': {} trainable, {} predictable, {} unresolvable",
            target, report.trainable, report.predictable, report.unresolvable
        );

        if trainable.is_empty() || predictable.is_empty() {
            report.skipped = Some(if trainable.is_empty() {
                SkipReason::NoTrainingRows
            } else {
                SkipReason::NothingToImpute
            });
            return Ok((df.clone(), report));
        }

        let row_vector = |row: usize| -> Vec<f64> {
            feature_values
                .iter()
                .map(|column| column[row].unwrap_or_default())
                .collect()
        };

        let k = self.neighbors_for(trainable.len());
        let samples: Vec<Vec<f64>> = trainable.iter().map(|&row| row_vector(row)).collect();
        let targets: Vec<f64> = trainable
            .iter()
            .filter_map(|&row| target_values[row])
            .collect();
        let regressor = KNNRegressor::new(k).fit(samples, targets);

        let queries: Vec<Vec<f64>> = predictable.iter().map(|&row| row_vector(row)).collect();
        let predictions = regressor.predict_many(&queries);

        let mut filled = target_values;
        for (&row, prediction) in predictable.iter().zip(predictions) {
            if let Some(value) = prediction {
                filled[row] = Some(value);
                report.imputed += 1;
            }
        }

        let mut result = df.clone();
        result
            .replace(target, Series::new(target.into(), filled))
            .context(format!("Writing '{}'", target))?;

        report.neighbors = Some(k);
        info!(
            "Imputed {} values in '{}' (k={}, {} training rows)",
            report.imputed, target, k, report.trainable
        );

        Ok((result, report))
    }
}
