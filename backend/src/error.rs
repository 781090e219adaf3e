//! Error handling for the SkyCast prediction service
//!
//! Every failure leaves the service as `{"error": {"code": ..., "message": ...}}`

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ForestError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { status: StatusCode, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Model errors
    #[error("Prediction failed: {0}")]
    Prediction(#[from] ForestError),

    #[error("Confusion matrix unavailable: {0}")]
    ConfusionMatrix(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Prediction(_) | AppError::ConfusionMatrix(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message) = match self {
            AppError::Validation { message, .. } => ("VALIDATION_ERROR", message.clone()),
            AppError::NotFound(resource) => ("NOT_FOUND", format!("{} not found", resource)),
            AppError::Prediction(err) => ("PREDICTION_ERROR", err.to_string()),
            AppError::ConfusionMatrix(msg) => ("CONFUSION_MATRIX_ERROR", msg.clone()),
        };
        ErrorDetail {
            code: code.to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: rejection.body_text(),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
