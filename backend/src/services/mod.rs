//! Business logic services for the SkyCast prediction service

pub mod model;
pub mod prediction;
pub mod records;

pub use model::{load_classifier, ModelService, WeatherClassifier};
pub use prediction::PredictionService;
pub use records::{RecordEvent, RecordStore};
