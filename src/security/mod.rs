//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming relay call:
//!     → limits (body size, enforced while reading the body)
//!     → access_key.rs (x-api-key check, before the body is parsed)
//!     → Pass to relay pipeline
//! ```
//!
//! # Design Decisions
//! - Fail closed: no configured key means no access
//! - Header sanitization of the forwarded token lives in `relay::params`

pub mod access_key;

pub use access_key::AccessKeyPolicy;
