//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (PORT, RELAY_KEY)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → RelayPolicy / UpstreamClient built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, CredentialSchemeKind, LimitsConfig, ListenerConfig, LogFormat, MethodFallbackKind,
    ObservabilityConfig, RelayConfig, RelayPolicyConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
