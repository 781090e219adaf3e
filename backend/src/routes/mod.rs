//! Route definitions for the SkyCast prediction service

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Record list
        .nest("/data", record_routes())
        // Trained model views
        .route("/feature-importance", get(handlers::get_feature_importance))
        .route("/confusion-matrix", get(handlers::get_confusion_matrix))
        // Inference
        .route("/predict", post(handlers::predict))
        // Record stream
        .route("/ws", get(handlers::stream_records))
}

/// Record list routes, addressed by position
fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_records).post(handlers::create_record))
        .route(
            "/:index",
            put(handlers::update_record).delete(handlers::delete_record),
        )
}
