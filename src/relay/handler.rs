//! The relay handler: one inbound call in, one outbound call, one reply out.

use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::error::RelayError;
use crate::relay::method::resolve_method;
use crate::relay::outbound::OutboundRequest;
use crate::relay::params::{RelayParams, RelayRequest};
use crate::relay::policy::RelayPolicy;
use crate::relay::upstream::{UpstreamClient, UpstreamResponse};

/// Successful relay result.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: StatusCode,
    pub body: Value,
}

impl RelayReply {
    pub fn from_upstream(upstream: UpstreamResponse, passthrough_status: bool) -> Self {
        let status = if passthrough_status {
            upstream.status
        } else {
            StatusCode::OK
        };

        Self {
            status,
            body: upstream.payload,
        }
    }
}

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Shared, read-only relay state.
#[derive(Debug, Clone)]
pub struct Relay {
    policy: RelayPolicy,
    upstream: UpstreamClient,
}

impl Relay {
    pub fn new(policy: RelayPolicy, upstream: UpstreamClient) -> Self {
        Self { policy, upstream }
    }

    /// Validate the call and build the outbound request without sending it.
    pub fn prepare(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<OutboundRequest, RelayError> {
        self.policy.access.authorize(headers)?;

        let request = RelayRequest::from_slice(body)?;
        let params = RelayParams::validate(request, self.policy.require_token)?;

        let method = resolve_method(params.method.as_deref(), method, &self.policy.method_fallback)?;
        OutboundRequest::build(&params, method, &self.policy.credential)
    }

    pub async fn relay(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<RelayReply, RelayError> {
        let outbound = self.prepare(method, headers, body)?;

        tracing::info!(
            method = %outbound.method,
            url = %outbound.url,
            "Dispatching upstream request"
        );

        let upstream = self.upstream.send(outbound).await?;

        tracing::debug!(
            status = upstream.status.as_u16(),
            content_type = upstream.content_type.as_deref().unwrap_or("-"),
            "Upstream responded"
        );

        Ok(RelayReply::from_upstream(upstream, self.policy.passthrough_status))
    }
}
