//! Height then crown-width imputation cascade.
//!
//! The cascade owns the species encoding for the duration of one call:
//! encoded columns are appended before the first stage and dropped after the
//! last, so callers never see them.

use crate::config::ImputationConfig;
use crate::encoding::SpeciesEncoder;
use crate::error::{ImputationError, Result, ResultExt};
use crate::imputers::TargetImputer;
use crate::schema::{CROWN_WIDTH, DBH, HEIGHT};
use crate::types::{CascadeReport, CascadeResult};
use crate::utils::{first_available_column, require_numeric_column};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the two-stage imputation cascade.
///
/// # Example
///
/// ```rust,ignore
/// use arbor_fill::{CascadeImputer, ImputationConfig};
///
/// let imputer = CascadeImputer::new(ImputationConfig::default())?;
/// let result = imputer.impute(&inventory)?;
/// println!("Filled {} values", result.report.total_imputed());
/// ```
pub struct CascadeImputer {
    config: ImputationConfig,
    encoder: SpeciesEncoder,
    imputer: TargetImputer,
}

// Independent datasets may be imputed from separate threads
static_assertions::assert_impl_all!(CascadeImputer: Send, Sync);

impl Default for CascadeImputer {
    fn default() -> Self {
        Self::from_valid_config(ImputationConfig::default())
    }
}

impl CascadeImputer {
    /// Create a cascade from a configuration, validating it first.
    pub fn new(config: ImputationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ImputationConfig) -> Self {
        Self {
            encoder: SpeciesEncoder::new(config.species_encoding),
            imputer: TargetImputer::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &ImputationConfig {
        &self.config
    }

    /// First accepted species column present in `df`.
    pub fn species_column<'a>(&'a self, df: &DataFrame) -> Result<&'a str> {
        first_available_column(df, &self.config.species_columns).ok_or_else(|| {
            ImputationError::SpeciesColumnNotFound {
                tried: self.config.species_columns.clone(),
            }
        })
    }

    /// Fill missing height, then crown width, returning a new dataset.
    ///
    /// Row order, row count and column order match the input. Observed values
    /// are never changed; rows whose features are incomplete stay missing.
    ///
    /// # Errors
    ///
    /// Schema errors when `DBH` or every species column is undefined, when a
    /// used column is not numeric, or when crown width is present without a
    /// height column to feed it.
    pub fn impute(&self, df: &DataFrame) -> Result<CascadeResult> {
        let start_time = Instant::now();

        require_numeric_column(df, DBH).context("Checking diameter column")?;
        let species_column = self.species_column(df)?;
        info!(
            "Imputing {} rows (species from '{}', {} encoding)",
            df.height(),
            species_column,
            self.config.species_encoding.display_name()
        );

        let encoded = self
            .encoder
            .encode(df, species_column)
            .context("Encoding species")?;
        let species_features = encoded.feature_columns;

        // Stage 1: height
        let mut height_features = vec![DBH.to_string()];
        height_features.extend(species_features.iter().cloned());
        let (data, height_report) = self
            .imputer
            .impute(&encoded.data, HEIGHT, &height_features)
            .context(format!("Imputing '{}'", HEIGHT))?;

        // Stage 2: crown width, reading the heights written above
        let mut width_features = vec![DBH.to_string(), HEIGHT.to_string()];
        width_features.extend(species_features.iter().cloned());
        let (mut data, width_report) = self
            .imputer
            .impute(&data, CROWN_WIDTH, &width_features)
            .context(format!("Imputing '{}'", CROWN_WIDTH))?;

        for name in &species_features {
            data.drop_in_place(name)?;
        }
        debug!("Dropped {} temporary species columns", species_features.len());

        let report = CascadeReport {
            rows: data.height(),
            species_column: species_column.to_string(),
            encoding: self.config.species_encoding,
            species_count: encoded.categories.len(),
            stages: vec![height_report, width_report],
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Imputation complete: {} values filled in {}ms",
            report.total_imputed(),
            report.duration_ms
        );

        Ok(CascadeResult { data, report })
    }
}

/// Run the cascade with default settings and return only the dataset.
pub fn fill_missing_measurements(df: &DataFrame) -> Result<DataFrame> {
    CascadeImputer::default().impute(df).map(|result| result.data)
}
