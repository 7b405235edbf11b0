//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay handler / tower-http TraceLayer
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - The request ID (x-request-id) is attached to every log line of a call
//! - Tokens and access keys are never logged

pub mod logging;
pub mod metrics;
