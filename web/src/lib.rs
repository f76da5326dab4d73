//! HTTP surface of Personal Pocket: routing, session authentication, authorization
//! guards and the JSON controllers sitting on top of the `domain` crate.
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum_login::{
    tower_sessions::{Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use log::*;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

pub use self::error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod extractors;
pub(crate) mod middleware;
mod params;
mod protect;
pub mod router;

const SESSION_TABLE: &str = "sessions";

/// Errors that can stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    SessionStore(String),
    Io(std::io::Error),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::SessionStore(reason) => write!(f, "session store: {reason}"),
            StartupError::Io(err) => write!(f, "io: {err}"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<std::io::Error> for StartupError {
    fn from(err: std::io::Error) -> Self {
        StartupError::Io(err)
    }
}

impl From<sqlx::Error> for StartupError {
    fn from(err: sqlx::Error) -> Self {
        StartupError::SessionStore(err.to_string())
    }
}

pub async fn init_server(app_state: AppState) -> std::result::Result<(), StartupError> {
    info!("Connecting to DB with URI: {}", app_state.config.database_url());

    // Sessions live in the application schema next to the rest of the data
    let session_store = PostgresStore::new(
        app_state
            .db_conn_ref()
            .get_postgres_connection_pool()
            .clone(),
    )
    .with_schema_name(app_state.config.db_schema())
    .map_err(StartupError::SessionStore)?
    .with_table_name(SESSION_TABLE)
    .map_err(StartupError::SessionStore)?;
    session_store.migrate().await?;

    let cleanup_interval =
        tokio::time::Duration::from_secs(app_state.config.session_cleanup_interval_seconds);
    let deletion_task = tokio::task::spawn({
        let session_store = session_store.clone();
        async move {
            if let Err(err) = session_store
                .continuously_delete_expired(cleanup_interval)
                .await
            {
                error!("Expired session cleanup stopped: {err}");
            }
        }
    });

    let session_expiry = Duration::seconds(
        i64::try_from(app_state.config.backend_session_expiry_seconds).unwrap_or(i64::MAX),
    );
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(session_expiry));

    let backend = domain::user::Backend::new(&app_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let server_url = format!(
        "{}:{}",
        app_state
            .config
            .interface
            .as_deref()
            .unwrap_or("127.0.0.1"),
        app_state.config.port
    );
    let listener = TcpListener::bind(&server_url).await?;

    let cors_layer = cors_layer(&app_state.config.allowed_origins);

    info!("Server starting... listening for connections on http://{server_url}");

    let router = router::define_routes(app_state)
        .layer(cors_layer)
        .layer(auth_layer);

    let served = axum::serve(listener, router.into_make_service()).await;
    deletion_task.abort();

    Ok(served?)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::DELETE, Method::GET, Method::POST, Method::PUT])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(service::config::ApiVersion::field_name()),
        ])
        .allow_origin(origins)
}
