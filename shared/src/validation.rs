//! Validation utilities for the SkyCast dashboard
//!
//! These ranges back the browser form. The prediction service itself accepts
//! any finite measurement, so nothing here runs on the request path.

use crate::models::WeatherInput;

/// Inclusive bounds for mean and apparent temperature (°C)
pub const TEMPERATURE_RANGE: (f64, f64) = (-100.0, 100.0);

/// Inclusive bounds for maximum wind speed (km/h)
pub const WINDSPEED_RANGE: (f64, f64) = (0.0, 200.0);

/// Inclusive bounds for daily precipitation (mm)
pub const PRECIPITATION_RANGE: (f64, f64) = (0.0, 1000.0);

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value.is_finite() && value >= min && value <= max
}

/// Validate a temperature reading
pub fn validate_temperature(value: f64) -> Result<(), &'static str> {
    if !in_range(value, TEMPERATURE_RANGE) {
        return Err("Temperature must be between -100 and 100 °C");
    }
    Ok(())
}

/// Validate an apparent temperature reading
pub fn validate_apparent_temperature(value: f64) -> Result<(), &'static str> {
    if !in_range(value, TEMPERATURE_RANGE) {
        return Err("Apparent temperature must be between -100 and 100 °C");
    }
    Ok(())
}

/// Validate a maximum wind speed
pub fn validate_windspeed(value: f64) -> Result<(), &'static str> {
    if !in_range(value, WINDSPEED_RANGE) {
        return Err("Wind speed must be between 0 and 200 km/h");
    }
    Ok(())
}

/// Validate a precipitation sum
pub fn validate_precipitation(value: f64) -> Result<(), &'static str> {
    if !in_range(value, PRECIPITATION_RANGE) {
        return Err("Precipitation must be between 0 and 1000 mm");
    }
    Ok(())
}

/// Validate every field of a form submission, reporting the first failure
pub fn validate_weather_input(input: &WeatherInput) -> Result<(), &'static str> {
    validate_temperature(input.temperature_2m_mean)?;
    validate_apparent_temperature(input.apparent_temperature_mean)?;
    validate_windspeed(input.windspeed_10m_max)?;
    validate_precipitation(input.precipitation_sum)?;
    Ok(())
}
