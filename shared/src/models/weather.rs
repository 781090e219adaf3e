//! Weather data models

use serde::{Deserialize, Serialize};

use crate::types::{FeatureVector, FEATURE_NAMES};

/// The four measured fields accepted by the create, update and predict endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherInput {
    pub temperature_2m_mean: f64,
    pub apparent_temperature_mean: f64,
    pub windspeed_10m_max: f64,
    pub precipitation_sum: f64,
}

impl WeatherInput {
    pub fn new(
        temperature_2m_mean: f64,
        apparent_temperature_mean: f64,
        windspeed_10m_max: f64,
        precipitation_sum: f64,
    ) -> Self {
        Self {
            temperature_2m_mean,
            apparent_temperature_mean,
            windspeed_10m_max,
            precipitation_sum,
        }
    }

    /// Feature vector in the fixed classifier order
    pub fn features(&self) -> FeatureVector {
        [
            self.temperature_2m_mean,
            self.apparent_temperature_mean,
            self.windspeed_10m_max,
            self.precipitation_sum,
        ]
    }
}

/// A record held in the service's in-memory list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherRecord {
    #[serde(flatten)]
    pub input: WeatherInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
}

impl WeatherRecord {
    /// A record entered by a client, without a predicted label
    pub fn observed(input: WeatherInput) -> Self {
        Self {
            input,
            prediction: None,
        }
    }

    /// A record produced by the predict endpoint
    pub fn predicted(input: WeatherInput, prediction: impl Into<String>) -> Self {
        Self {
            input,
            prediction: Some(prediction.into()),
        }
    }
}

impl From<WeatherInput> for WeatherRecord {
    fn from(input: WeatherInput) -> Self {
        Self::observed(input)
    }
}

/// Outcome status of a prediction call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Success,
}

/// Response body of the predict endpoint: the label plus the echoed input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResponse {
    pub status: PredictionStatus,
    pub prediction: String,
    #[serde(flatten)]
    pub input: WeatherInput,
}

impl PredictionResponse {
    pub fn success(prediction: impl Into<String>, input: WeatherInput) -> Self {
        Self {
            status: PredictionStatus::Success,
            prediction: prediction.into(),
            input,
        }
    }
}

/// Per-feature importance weights keyed by feature name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureImportance {
    pub temperature_2m_mean: f64,
    pub apparent_temperature_mean: f64,
    pub windspeed_10m_max: f64,
    pub precipitation_sum: f64,
}

impl FeatureImportance {
    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, weight)| weight).sum()
    }

    /// `(name, weight)` pairs in the fixed feature order
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            (FEATURE_NAMES[0], self.temperature_2m_mean),
            (FEATURE_NAMES[1], self.apparent_temperature_mean),
            (FEATURE_NAMES[2], self.windspeed_10m_max),
            (FEATURE_NAMES[3], self.precipitation_sum),
        ]
    }
}

impl From<FeatureVector> for FeatureImportance {
    fn from(weights: FeatureVector) -> Self {
        Self {
            temperature_2m_mean: weights[0],
            apparent_temperature_mean: weights[1],
            windspeed_10m_max: weights[2],
            precipitation_sum: weights[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_prediction_omits_label() {
        let record = WeatherRecord::observed(WeatherInput::new(20.0, 19.0, 10.0, 0.0));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "temperature_2m_mean": 20.0,
                "apparent_temperature_mean": 19.0,
                "windspeed_10m_max": 10.0,
                "precipitation_sum": 0.0,
            })
        );
    }

    #[test]
    fn test_record_with_prediction_is_flat() {
        let record = WeatherRecord::predicted(WeatherInput::new(1.0, 2.0, 3.0, 4.0), "Fog");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["prediction"], "Fog");
        assert_eq!(json["windspeed_10m_max"], 3.0);
    }

    #[test]
    fn test_input_rejects_missing_field() {
        let body = r#"{"temperature_2m_mean": 1.0, "apparent_temperature_mean": 2.0, "windspeed_10m_max": 3.0}"#;
        assert!(serde_json::from_str::<WeatherInput>(body).is_err());
    }

    #[test]
    fn test_prediction_response_shape() {
        let response =
            PredictionResponse::success("Thunderstorm", WeatherInput::new(30.0, 33.0, 40.0, 25.0));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["prediction"], "Thunderstorm");
        assert_eq!(json["precipitation_sum"], 25.0);
    }

    #[test]
    fn test_feature_importance_keys_match_feature_names() {
        let importance = FeatureImportance::from([0.4, 0.3, 0.2, 0.1]);
        let json = serde_json::to_value(importance).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys.len(), 4);
        for name in FEATURE_NAMES {
            assert!(keys.contains(&name));
        }
        assert!((importance.total() - 1.0).abs() < 1e-12);
    }
}
