//! WebAssembly module for the SkyCast dashboard
//!
//! Provides client-side helpers for:
//! - Form validation before a prediction request
//! - Feature importance chart data
//! - Weather code descriptions

use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::models::{FeatureImportance, WeatherInput};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("skycast-wasm ready"));
}

/// Validate a form submission; the error carries the first failing field's message
#[wasm_bindgen]
pub fn validate_weather_input(input_json: &str) -> Result<(), JsValue> {
    check_weather_input(input_json).map_err(|e| JsValue::from_str(&e))
}

fn check_weather_input(input_json: &str) -> Result<(), String> {
    let input: WeatherInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid input JSON: {}", e))?;
    shared::validation::validate_weather_input(&input).map_err(str::to_string)
}

/// `temperature_2m_mean` becomes `Temperature 2m Mean`
#[wasm_bindgen]
pub fn format_feature_name(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    pub percent: f64,
}

/// Turn a `/feature-importance` response into pie chart slices
#[wasm_bindgen]
pub fn importance_chart_data(importance_json: &str) -> Result<String, JsValue> {
    let slices = chart_slices(importance_json).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&slices).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn chart_slices(importance_json: &str) -> Result<Vec<ChartSlice>, String> {
    let importance: FeatureImportance = serde_json::from_str(importance_json)
        .map_err(|e| format!("Invalid feature importance JSON: {}", e))?;
    let total = importance.total();

    Ok(importance
        .entries()
        .iter()
        .map(|&(name, value)| ChartSlice {
            name: format_feature_name(name),
            value,
            percent: if total > 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect())
}

/// Description of a WMO weather code, or "Unknown Condition"
#[wasm_bindgen]
pub fn weather_condition(code: i32) -> String {
    shared::models::weather_condition(code).to_string()
}
