//! Axum server setup
//!
//! Server skeleton with:
//! - Configurable CORS (wildcard or origin list)
//! - Tracing middleware
//! - Connection-ensure middleware on database-backed routes
//! - JSON 404 fallback and panic handler
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::any::Any;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::middleware::require_database;
use super::routes;
use crate::config::{ConfigError, ConnectMode, ServerConfig};
use crate::db::{DbError, PgConnector, PgStore, Store};

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn Store>,
}

/// Build the application router around a store.
pub fn build_router(store: Arc<dyn Store>, cors: CorsLayer) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .merge(routes::courses::router())
        .merge(routes::students::router())
        .merge(routes::dashboard::router())
        // Only the routes merged above go through the connection check
        .route_layer(from_fn_with_state(state.clone(), require_database))
        .merge(routes::health::router())
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::new(database_url);
/// run_server(config).await?;
/// ```
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let cors = config.cors.layer()?;
    let store = Arc::new(PgStore::new(PgConnector::new(
        config.database_url.as_str(),
        config.max_connections,
    )));

    match config.connect_mode {
        ConnectMode::Eager => {
            tracing::info!("Connecting to database before accepting requests");
            store.ensure_ready().await?;
        }
        ConnectMode::Lazy => {
            tracing::info!("Database connection deferred until first request");
        }
    }

    let app = build_router(store, cors);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::Internal {
        message: format!("handler panicked: {detail}"),
    }
    .into_response()
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn panic_payload_becomes_generic_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(String::from("boom")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn eager_mode_fails_fast_without_database() {
        let mut config = ServerConfig::new("not a database url");
        config.connect_mode = ConnectMode::Eager;

        let err = run_server(config).await.unwrap_err();
        assert!(matches!(err, ServerError::Database(DbError::Unavailable(_))));
    }
}
