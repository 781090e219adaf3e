//! SkyCast - Weather Prediction Server
//!
//! Loads the random forest produced by `skycast-train` and serves predictions,
//! the record list and its WebSocket stream.

use skycast_server::{config, create_app, services, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    // Initialize tracing
    let json = config.log.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast_server=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting SkyCast prediction server");
    tracing::info!("Environment: {}", config.environment);

    let classifier = services::load_classifier(&config.model.path)?;

    // Create application state
    let addr = config.bind_address();
    let state = AppState::new(config, classifier);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
