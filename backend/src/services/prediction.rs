//! Prediction service: classify a measurement and record the outcome

use std::sync::Arc;

use shared::models::{
    describe_weather_code, PredictionResponse, WeatherInput, WeatherRecord, UNKNOWN_CONDITION,
};

use crate::error::AppResult;
use crate::services::{RecordStore, WeatherClassifier};

pub struct PredictionService {
    classifier: Arc<dyn WeatherClassifier>,
    records: RecordStore,
}

impl PredictionService {
    pub fn new(classifier: Arc<dyn WeatherClassifier>, records: RecordStore) -> Self {
        Self {
            classifier,
            records,
        }
    }

    /// Classify `input`, append the labelled record and echo the input back
    pub async fn predict(&self, input: WeatherInput) -> AppResult<PredictionResponse> {
        let code = self.classifier.predict(&input.features())?;

        let condition = match describe_weather_code(code) {
            Some(condition) => condition,
            None => {
                tracing::warn!(code, "Model returned a weather code with no known condition");
                UNKNOWN_CONDITION
            }
        };
        tracing::debug!(code, condition, "Predicted weather condition");

        self.records
            .append(WeatherRecord::predicted(input, condition))
            .await;

        Ok(PredictionResponse::success(condition, input))
    }
}
