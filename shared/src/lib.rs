//! Shared types and models for the SkyCast weather prediction platform
//!
//! This crate contains the types shared between the prediction service, the
//! offline trainer and the browser helpers (via WASM), together with the
//! random-forest classifier that links the trainer to the service (behind the
//! `forest` feature).

#[cfg(feature = "forest")]
pub mod forest;
pub mod models;
pub mod types;
pub mod validation;

#[cfg(feature = "forest")]
pub use forest::{ClassWeight, ForestError, MaxFeatures, RandomForest, RandomForestParams};
pub use models::*;
pub use types::*;
pub use validation::*;
