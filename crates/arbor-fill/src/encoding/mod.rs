//! Categorical encoding for distance-based regression.
//!
//! Species labels are nominal; the encoders here turn them into transient
//! `Float64` feature columns that live only for the duration of one cascade.

mod species;

pub use species::{EncodedSpecies, SpeciesEncoder};
