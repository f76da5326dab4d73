use log::{error, info};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!("Seeding database [{}]...", config.database_url());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);

    match entity_api::seed_database(service_state.db_conn_ref()).await {
        Ok(()) => info!("Database seeded"),
        Err(e) => {
            error!("Failed to seed database: {e:?}");
            std::process::exit(1);
        }
    }
}
