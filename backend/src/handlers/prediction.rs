//! HTTP handler for weather-condition prediction

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use crate::error::{AppError, AppResult};
use crate::models::{PredictionResponse, WeatherInput};
use crate::services::PredictionService;
use crate::AppState;

/// Predict the weather condition for a measurement
pub async fn predict(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<WeatherInput>, AppError>,
) -> AppResult<Json<PredictionResponse>> {
    let service = PredictionService::new(state.classifier.clone(), state.records.clone());
    let response = service.predict(input).await?;
    Ok(Json(response))
}
