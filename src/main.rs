//! API Relay
//!
//! A credential-injecting HTTP relay built with Tokio, Axum and reqwest.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                       API RELAY                       │
//!                      │                                                       │
//!   Client Request     │  ┌──────────┐   ┌──────────┐   ┌───────────────────┐  │
//!   ───────────────────┼─▶│  http    │──▶│ security │──▶│ relay::params     │  │
//!   POST /relay        │  │  server  │   │ x-api-key│   │ url / token / body│  │
//!   x-api-key: …       │  └──────────┘   └──────────┘   └─────────┬─────────┘  │
//!                      │                                          ▼            │
//!                      │                                ┌───────────────────┐  │
//!                      │                                │ relay::outbound   │  │
//!                      │                                │ method, query,    │  │
//!                      │                                │ credential header │  │
//!                      │                                └─────────┬─────────┘  │
//!                      │                                          ▼            │
//!   Client Response    │  ┌──────────┐   ┌──────────┐   ┌───────────────────┐  │
//!   ◀──────────────────┼──│ RelayReply◀──│  decode  │◀──│ relay::upstream   │◀─┼── Target API
//!                      │  └──────────┘   └──────────┘   └───────────────────┘  │
//!                      │                                                       │
//!                      │  config · observability · lifecycle                   │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_relay::config::load_config;
use api_relay::lifecycle::{self, signals, Shutdown};
use api_relay::observability::logging;

#[derive(Parser)]
#[command(name = "api-relay")]
#[command(about = "Credential-injecting HTTP relay", long_about = None)]
#[command(version)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-relay starting");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    lifecycle::launch(config, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
