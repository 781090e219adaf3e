//! Error types for fitting and evaluating the random forest

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForestError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Expected {expected} labels, found {found}")]
    LabelCountMismatch { expected: usize, found: usize },

    #[error("Expected {expected} features, found {found}")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("Feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Tree fitting failed: {0}")]
    Fit(String),

    #[error("Model has no fitted trees")]
    NotFitted,

    #[error("Model file is corrupt: {0}")]
    CorruptModel(String),

    #[error("Model I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
