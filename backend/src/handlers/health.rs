//! Health check and root handlers

use axum::{extract::State, Json};
use serde::Serialize;
use shared::MessageResponse;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_trees: usize,
    pub records: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_trees: state.classifier.n_estimators(),
        records: state.records.len().await,
    })
}

/// Root endpoint
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello World"))
}
