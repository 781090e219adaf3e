//! Models for the SkyCast prediction service
//!
//! Re-exports the request and response models from the shared crate

pub use shared::models::*;
