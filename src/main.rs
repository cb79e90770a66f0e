use models::{CliApp, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod analysis;
mod api;
mod batch;
mod cache;
mod cli;
mod config;
mod database;
mod llm;
mod metrics;
mod models;
mod server;

use analysis::AnalysisOrchestrator;
use config::{load_config, Config};
use database::create_db_pool;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    // Setup logging
    std::env::set_var("RUST_LOG", "email_insight=info,hyper=warn,rocket=warn");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("email_insight=info".parse().unwrap()),
        )
        .with_max_level(tracing::Level::INFO)
        .init();

    // Initialize database
    info!("Initializing database...");
    let db_pool = create_db_pool(&config.database.path).await?;

    // API server mode
    if std::env::args().any(|arg| arg == "--serve") {
        info!("Starting Email Insight API server...");
        let orchestrator = AnalysisOrchestrator::from_config(&config)?;
        server::build_rocket(config, db_pool, orchestrator)
            .launch()
            .await?;
        return Ok(());
    }

    // Initialize and run CLI app
    let app = CliApp::new(config, db_pool).await?;

    // Add graceful shutdown
    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
