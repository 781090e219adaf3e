//! SkyCast - Weather Prediction Service
//!
//! Serves weather-condition predictions from a random forest trained offline,
//! keeps an in-memory list of submitted and predicted records, and streams that
//! list to WebSocket subscribers.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use services::{RecordStore, WeatherClassifier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub records: RecordStore,
    pub classifier: Arc<dyn WeatherClassifier>,
}

impl AppState {
    pub fn new(config: Config, classifier: Arc<dyn WeatherClassifier>) -> Self {
        let records = RecordStore::new(config.stream.channel_capacity);
        Self {
            config: Arc::new(config),
            records,
            classifier,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(routes::api_routes())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
