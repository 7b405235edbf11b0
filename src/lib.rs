//! API Relay Library
//!
//! Forwards a caller's request to a target URL with an injected credential
//! header, guarded by the relay's own access key.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod security;

pub use config::schema::RelayConfig;
pub use error::RelayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::Relay;
