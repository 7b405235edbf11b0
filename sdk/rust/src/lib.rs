//! Client for the API relay.

mod client;

pub use client::{RelayCall, RelayClient, RelayOutcome};
