//! Configuration for the imputation cascade.
//!
//! Feature sets are fixed by the cascade; only the neighborhood bounds, the
//! species encoding strategy and the accepted species column names are
//! tunable per deployment.

use serde::{Deserialize, Serialize};

/// Default floor for the neighborhood size.
pub const DEFAULT_MIN_NEIGHBORS: usize = 5;

/// Default cap for the neighborhood size.
pub const DEFAULT_MAX_NEIGHBORS: usize = 30;

/// Accepted species identifier columns, in priority order.
pub const DEFAULT_SPECIES_COLUMNS: [&str; 2] = ["Scientific Name", "Full Name"];

/// How the species label is turned into regression features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesEncoding {
    /// One 0/1 indicator column per distinct species
    #[default]
    OneHot,
    /// A single code column holding the species' rank in the sorted domain
    Ordinal,
}

impl SpeciesEncoding {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OneHot => "one-hot",
            Self::Ordinal => "ordinal",
        }
    }
}

/// Configuration for [`crate::CascadeImputer`].
///
/// Use [`ImputationConfig::builder()`] for a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use arbor_fill::{ImputationConfig, SpeciesEncoding};
///
/// let config = ImputationConfig::builder()
///     .min_neighbors(1)
///     .species_encoding(SpeciesEncoding::Ordinal)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationConfig {
    /// Lower bound for the neighborhood size.
    /// Default: 5
    pub min_neighbors: usize,

    /// Upper bound for the neighborhood size.
    /// Default: 30
    pub max_neighbors: usize,

    /// Species encoding strategy.
    /// Default: OneHot
    pub species_encoding: SpeciesEncoding,

    /// Species columns to try, first match wins.
    /// Default: ["Scientific Name", "Full Name"]
    pub species_columns: Vec<String>,
}

impl Default for ImputationConfig {
    fn default() -> Self {
        Self {
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            max_neighbors: DEFAULT_MAX_NEIGHBORS,
            species_encoding: SpeciesEncoding::default(),
            species_columns: DEFAULT_SPECIES_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ImputationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ImputationConfigBuilder {
        ImputationConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.min_neighbors == 0 {
            return Err(ConfigValidationError::InvalidMinNeighbors(
                self.min_neighbors,
            ));
        }

        if self.max_neighbors < self.min_neighbors {
            return Err(ConfigValidationError::NeighborBoundsInverted {
                min: self.min_neighbors,
                max: self.max_neighbors,
            });
        }

        if self.species_columns.is_empty() {
            return Err(ConfigValidationError::NoSpeciesColumns);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid minimum neighbors: {0} (must be at least 1)")]
    InvalidMinNeighbors(usize),

    #[error("Invalid neighbor bounds: max {max} is below min {min}")]
    NeighborBoundsInverted { min: usize, max: usize },

    #[error("At least one species column name is required")]
    NoSpeciesColumns,
}

impl From<ConfigValidationError> for crate::error::ImputationError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::ImputationError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ImputationConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ImputationConfigBuilder {
    min_neighbors: Option<usize>,
    max_neighbors: Option<usize>,
    species_encoding: Option<SpeciesEncoding>,
    species_columns: Option<Vec<String>>,
}

impl ImputationConfigBuilder {
    /// Set the neighborhood floor.
    pub fn min_neighbors(mut self, k: usize) -> Self {
        self.min_neighbors = Some(k);
        self
    }

    /// Set the neighborhood cap.
    pub fn max_neighbors(mut self, k: usize) -> Self {
        self.max_neighbors = Some(k);
        self
    }

    /// Set the species encoding strategy.
    pub fn species_encoding(mut self, encoding: SpeciesEncoding) -> Self {
        self.species_encoding = Some(encoding);
        self
    }

    /// Replace the accepted species column names.
    ///
    /// The order matters: the first column present in the dataset is used.
    pub fn species_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.species_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ImputationConfig` or an error if validation fails.
    pub fn build(self) -> Result<ImputationConfig, ConfigValidationError> {
        let defaults = ImputationConfig::default();
        let config = ImputationConfig {
            min_neighbors: self.min_neighbors.unwrap_or(defaults.min_neighbors),
            max_neighbors: self.max_neighbors.unwrap_or(defaults.max_neighbors),
            species_encoding: self.species_encoding.unwrap_or_default(),
            species_columns: self.species_columns.unwrap_or(defaults.species_columns),
        };

        config.validate()?;
        Ok(config)
    }
}
