//! HTTP handlers for the in-memory record list

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::error::{AppError, AppResult};
use crate::models::{WeatherInput, WeatherRecord};
use crate::AppState;

/// List every record in insertion order
pub async fn list_records(State(state): State<AppState>) -> Json<Vec<WeatherRecord>> {
    Json(state.records.list().await)
}

/// Append a record
pub async fn create_record(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<WeatherInput>, AppError>,
) -> AppResult<Json<WeatherRecord>> {
    let record = state.records.create(input).await;
    Ok(Json(record))
}

/// Replace the record at a position
pub async fn update_record(
    State(state): State<AppState>,
    WithRejection(Path(raw), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(input), _): WithRejection<Json<WeatherInput>, AppError>,
) -> AppResult<Json<WeatherRecord>> {
    let record = state.records.update(parse_index(&raw)?, input).await?;
    Ok(Json(record))
}

/// Remove the record at a position
pub async fn delete_record(
    State(state): State<AppState>,
    WithRejection(Path(raw), _): WithRejection<Path<String>, AppError>,
) -> AppResult<Json<WeatherRecord>> {
    let record = state.records.delete(parse_index(&raw)?).await?;
    Ok(Json(record))
}

/// An integer too large for `i64` can only point past the end of the list
fn parse_index(raw: &str) -> AppResult<i64> {
    if let Ok(index) = raw.parse::<i64>() {
        return Ok(index);
    }
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound("Data".to_string()));
    }
    Err(AppError::Validation {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: format!("Invalid record index: {}", raw),
    })
}
