//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! inbound (method, headers, body bytes)
//!     → security::AccessKeyPolicy   (401)
//!     → params.rs  RelayRequest → RelayParams   (400)
//!     → method.rs  override / fallback
//!     → outbound.rs  headers, GET query or JSON payload
//!     → upstream.rs  reqwest call, bounded timeout   (500 on failure)
//!     → decode.rs  content-type → JSON or text
//!     → handler.rs  RelayReply (status passthrough)
//! ```

pub mod decode;
pub mod handler;
pub mod method;
pub mod outbound;
pub mod params;
pub mod policy;
pub mod query;
pub mod upstream;

pub use handler::{Relay, RelayReply};
pub use method::MethodFallback;
pub use outbound::{CredentialScheme, OutboundRequest};
pub use params::{RelayParams, RelayRequest};
pub use policy::RelayPolicy;
pub use upstream::{UpstreamClient, UpstreamResponse};
