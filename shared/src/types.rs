//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Number of input features the classifier consumes
pub const N_FEATURES: usize = 4;

/// Feature names in the order the classifier expects them
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "temperature_2m_mean",
    "apparent_temperature_mean",
    "windspeed_10m_max",
    "precipitation_sum",
];

/// Name of the label column in the training dataset
pub const LABEL_COLUMN: &str = "weathercode";

/// A single feature vector in [`FEATURE_NAMES`] order
pub type FeatureVector = [f64; N_FEATURES];

/// Response body of the root endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
