//! Domain models for the SkyCast weather service

mod weather;
mod weather_code;

pub use weather::*;
pub use weather_code::*;
