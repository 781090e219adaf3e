//! HTTP handlers for the SkyCast prediction service

pub mod health;
pub mod model;
pub mod prediction;
pub mod records;
pub mod stream;

pub use health::{health_check, root};
pub use model::{get_confusion_matrix, get_feature_importance};
pub use prediction::predict;
pub use records::{create_record, delete_record, list_records, update_record};
pub use stream::stream_records;
