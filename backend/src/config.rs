//! Configuration management for the SkyCast prediction service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with the SKYCAST prefix (`SKYCAST__SERVER__PORT`)

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Trained model artifacts
    pub model: ModelConfig,

    /// WebSocket record stream
    pub stream: StreamConfig,

    /// Log output
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Serialized random forest written by the trainer
    pub path: String,

    /// Confusion matrix JSON served verbatim
    pub confusion_matrix_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    /// Maximum seconds between two pushes to a subscriber
    pub interval_secs: u64,

    /// Buffered change notifications per subscriber before it lags
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Emit one JSON object per event instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SKYCAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("model.path", "models/random_forest_model_weather.json")?
            .set_default("model.confusion_matrix_path", "confusion_matrix.json")?
            .set_default("stream.interval_secs", 5)?
            .set_default("stream.channel_capacity", 64)?
            .set_default("log.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SKYCAST prefix)
            .add_source(
                Environment::with_prefix("SKYCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/random_forest_model_weather.json".to_string(),
            confusion_matrix_path: "confusion_matrix.json".to_string(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            channel_capacity: 64,
        }
    }
}
