//! Marginalia Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use marginalia_core::MarginaliaConfig;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main Marginalia web server
pub struct MarginaliaServer {
    config: WebConfig,
    state: AppState,
}

impl MarginaliaServer {
    pub fn new(config: WebConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the web server and run until Ctrl+C
    pub async fn start(self) -> WebResult<()> {
        let address: SocketAddr = self.config.address().parse().map_err(|e| {
            WebError::Config(format!("Invalid listen address {}: {}", self.config.address(), e))
        })?;

        info!(
            %address,
            authority = %self.state.config.authority,
            "Starting Marginalia Web Server"
        );

        let app = create_app(self.state);

        let listener = TcpListener::bind(address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for MarginaliaServer
pub struct MarginaliaServerBuilder {
    config: MarginaliaConfig,
    host: Option<String>,
    port: Option<u16>,
}

impl MarginaliaServerBuilder {
    pub fn new(config: MarginaliaConfig) -> Self {
        Self {
            config,
            host: None,
            port: None,
        }
    }

    /// Set the server host, overriding configuration and environment
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the server port, overriding configuration and environment
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<MarginaliaServer> {
        let mut web_config = WebConfig::from_server_config(&self.config.server)?;
        if let Some(host) = self.host {
            web_config.host = host;
        }
        if let Some(port) = self.port {
            web_config.port = port;
        }

        let state = AppState::new(self.config)?;
        Ok(MarginaliaServer::new(web_config, state))
    }
}
