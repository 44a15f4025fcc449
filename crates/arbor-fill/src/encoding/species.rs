use crate::config::SpeciesEncoding;
use crate::error::Result;
use crate::schema::SPECIES_FEATURE_PREFIX;
use crate::utils::{string_values, unused_column_name};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Result of encoding a species column.
#[derive(Debug, Clone)]
pub struct EncodedSpecies {
    /// Input dataset with the encoded columns appended.
    pub data: DataFrame,
    /// Names of the appended columns, in category order.
    pub feature_columns: Vec<String>,
    /// Distinct species labels, sorted.
    pub categories: Vec<String>,
}

pub struct SpeciesEncoder {
    strategy: SpeciesEncoding,
}

impl SpeciesEncoder {
    pub fn new(strategy: SpeciesEncoding) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SpeciesEncoding {
        self.strategy
    }

    /// Append numeric species features to a copy of `df`.
    ///
    /// Rows with no species get null in every encoded column, so they drop
    /// out of any feature set that includes species. Existing columns are
    /// left untouched.
    pub fn encode(&self, df: &DataFrame, species_column: &str) -> Result<EncodedSpecies> {
        let labels = string_values(df, species_column)?;
        let categories = Self::categories(&labels);

        debug!(
            "Encoding '{}' ({} categories, {})",
            species_column,
            categories.len(),
            self.strategy.display_name()
        );

        let mut data = df.clone();
        let feature_columns = match self.strategy {
            SpeciesEncoding::OneHot => Self::one_hot(&mut data, &labels, &categories)?,
            SpeciesEncoding::Ordinal => Self::ordinal(&mut data, &labels, &categories)?,
        };

        Ok(EncodedSpecies {
            data,
            feature_columns,
            categories,
        })
    }

    /// Sorted distinct non-null labels.
    fn categories(labels: &[Option<String>]) -> Vec<String> {
        labels
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn one_hot(
        data: &mut DataFrame,
        labels: &[Option<String>],
        categories: &[String],
    ) -> Result<Vec<String>> {
        if categories.is_empty() {
            // No observed species: a single all-null column still marks every
            // row as lacking the species feature.
            let name = unused_column_name(data, SPECIES_FEATURE_PREFIX);
            let missing: Vec<Option<f64>> = vec![None; labels.len()];
            data.with_column(Series::new(name.as_str().into(), missing))?;
            return Ok(vec![name]);
        }

        let mut names = Vec::with_capacity(categories.len());

        for category in categories {
            let name = unused_column_name(
                data,
                &format!("{}_{}", SPECIES_FEATURE_PREFIX, category),
            );
            let indicator: Vec<Option<f64>> = labels
                .iter()
                .map(|label| {
                    label
                        .as_deref()
                        .map(|l| if l == category.as_str() { 1.0 } else { 0.0 })
                })
                .collect();

            data.with_column(Series::new(name.as_str().into(), indicator))?;
            names.push(name);
        }

        Ok(names)
    }

    fn ordinal(
        data: &mut DataFrame,
        labels: &[Option<String>],
        categories: &[String],
    ) -> Result<Vec<String>> {
        let name = unused_column_name(data, &format!("{}_code", SPECIES_FEATURE_PREFIX));
        let codes: Vec<Option<f64>> = labels
            .iter()
            .map(|label| {
                label.as_ref().and_then(|l| {
                    categories
                        .binary_search(l)
                        .ok()
                        .map(|code| code as f64)
                })
            })
            .collect();

        data.with_column(Series::new(name.as_str().into(), codes))?;
        Ok(vec![name])
    }
}
