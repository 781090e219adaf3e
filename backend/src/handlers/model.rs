//! HTTP handlers exposing the trained model

use axum::{extract::State, Json};
use shared::FeatureImportance;

use crate::error::AppResult;
use crate::services::ModelService;
use crate::AppState;

fn model_service(state: &AppState) -> ModelService {
    ModelService::new(
        state.classifier.clone(),
        &state.config.model.confusion_matrix_path,
    )
}

/// Importance of each input feature
pub async fn get_feature_importance(State(state): State<AppState>) -> Json<FeatureImportance> {
    Json(model_service(&state).feature_importance())
}

/// Confusion matrix from the last training run
pub async fn get_confusion_matrix(
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let matrix = model_service(&state).confusion_matrix().await?;
    Ok(Json(matrix))
}
