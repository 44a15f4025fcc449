//! Pipeline module.
//!
//! This module sequences the imputation stages over a full inventory.

mod cascade;

pub use cascade::{CascadeImputer, fill_missing_measurements};
