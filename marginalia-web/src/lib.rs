//! Marginalia Web Server
//!
//! HTTP surface over the authentication crates: Basic credentials in,
//! principals out.

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::MarginaliaServer;
pub use state::AppState;

use axum::Router;
use marginalia_core::MarginaliaError;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl WebConfig {
    /// Start from the `[server]` table, then apply `MARGINALIA_HOST` and
    /// `MARGINALIA_PORT`
    pub fn from_server_config(server: &marginalia_core::ServerConfig) -> WebResult<Self> {
        Self::with_overrides(
            server,
            std::env::var("MARGINALIA_HOST").ok(),
            std::env::var("MARGINALIA_PORT").ok(),
        )
    }

    fn with_overrides(
        server: &marginalia_core::ServerConfig,
        host: Option<String>,
        port: Option<String>,
    ) -> WebResult<Self> {
        let port = match port {
            Some(value) => value.trim().parse().map_err(|e| {
                WebError::Config(format!("Invalid MARGINALIA_PORT {:?}: {}", value, e))
            })?,
            None => server.port,
        };

        Ok(Self {
            host: host.unwrap_or_else(|| server.host.clone()),
            port,
        })
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] MarginaliaError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
