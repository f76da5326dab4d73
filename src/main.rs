//! Personal Pocket API server.
//!
//! Reads configuration from the command line and environment, connects to Postgres
//! and serves the JSON API until the process is stopped.
use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting Personal Pocket API [{}] in {} mode",
        config.api_version(),
        config.runtime_env
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &db);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }
}
