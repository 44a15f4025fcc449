//! Nearest-neighbor imputation.
//!
//! - [`KNNRegressor`]: distance-weighted KNN regression over dense feature vectors
//! - [`TargetImputer`]: fills one target column from a fixed feature set

mod knn;
mod target;

pub use knn::{KNNRegressor, neighborhood_size};
pub use target::{RowClass, RowPartition, TargetImputer};
