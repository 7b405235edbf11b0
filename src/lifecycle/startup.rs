//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from a validated configuration
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after every subsystem is ready

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::RelayConfig;
use crate::http::server::ServerError;
use crate::http::HttpServer;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the relay with `config` until `shutdown` resolves.
pub async fn launch(config: RelayConfig, shutdown: ShutdownSignal) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        enforce_access_key = config.relay.enforce_access_key,
        credential_scheme = ?config.relay.credential_scheme,
        method_fallback = ?config.relay.method_fallback,
        passthrough_status = config.relay.passthrough_status,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(config.clone())?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    server.run(listener, shutdown).await.map_err(StartupError::Serve)
}
