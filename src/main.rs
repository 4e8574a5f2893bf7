//! ASTRA-CARE: astronaut wellbeing telemetry and risk-scoring API.
//!
//! This is the application entry point. It loads configuration from a
//! TOML file, initializes tracing, opens the SQLite pool and creates the
//! schema, builds the completion client for the support chat, sets up
//! the Axum router with all routes, and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astracare::auth::TokenSigner;
use astracare::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use astracare::http::start_server;
use astracare::routes::create_router;
use astracare::state::AppState;
use astracare::store;
use astracare::support::CompletionClient;

/// ASTRA-CARE: astronaut wellbeing telemetry and risk-scoring API
#[derive(Parser, Debug)]
#[command(name = "astracare", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "astracare=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = %args.config, "Loaded configuration");

    // Open the database pool and create the schema
    let db = store::connect(&config.database).await?;
    store::init_schema(&db).await?;
    tracing::info!(url = %config.database.url, "Initialized database");

    // Token signer for bearer authentication
    let signer = TokenSigner::new(
        &config.auth.resolve_secret()?,
        config.auth.token_lifetime_hours,
    );

    // Completion client for the support chat proxy
    let api_key = config.llm.resolve_api_key()?;
    let support = CompletionClient::new(&config.llm, api_key)?;
    tracing::info!(
        base_url = %config.llm.base_url,
        model = %config.llm.model,
        "Initialized support completion client"
    );

    // Create application state and router
    let state = AppState::new(config.clone(), db, signer, Arc::new(support));
    let app = create_router(state);

    // Start server (blocks until shutdown)
    start_server(app, &config).await?;

    Ok(())
}
