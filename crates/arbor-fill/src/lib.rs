//! Tree Inventory Gap-Filling Library
//!
//! Fills missing tree height and crown width in a municipal tree inventory
//! with distance-weighted nearest-neighbor regression, built on Polars.
//!
//! # Overview
//!
//! - **Species Encoding**: nominal species labels become transient numeric features
//! - **Target Imputation**: one column at a time, trained on fully observed rows
//! - **Cascade**: height first, then crown width using the freshly imputed heights
//! - **Loading**: CSV ingestion that splits combined species labels and coerces measurements
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use arbor_fill::{CascadeImputer, ImputationConfig, io};
//!
//! let inventory = io::load_inventory("trees.csv")?;
//!
//! let result = CascadeImputer::new(ImputationConfig::default())?.impute(&inventory)?;
//!
//! for stage in &result.report.stages {
//!     println!("{}: {} imputed", stage.target, stage.imputed);
//! }
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use arbor_fill::{ImputationConfig, SpeciesEncoding};
//!
//! let config = ImputationConfig::builder()
//!     .min_neighbors(1)                            // Neighborhood floor
//!     .max_neighbors(30)                           // Neighborhood cap
//!     .species_encoding(SpeciesEncoding::Ordinal)  // Single code column
//!     .species_columns(["Scientific Name", "Full Name"])
//!     .build()?;
//! ```
//!
//! Feature sets are fixed: `DBH` plus species for height, `DBH`, `Height`
//! plus species for crown width.

pub mod config;
pub mod encoding;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, ImputationConfig, ImputationConfigBuilder, SpeciesEncoding,
};
pub use encoding::{EncodedSpecies, SpeciesEncoder};
pub use error::{ImputationError, Result as ImputationResult, ResultExt};
pub use imputers::{KNNRegressor, RowClass, RowPartition, TargetImputer, neighborhood_size};
pub use pipeline::{CascadeImputer, fill_missing_measurements};
pub use types::{CascadeReport, CascadeResult, SkipReason, StageReport};
