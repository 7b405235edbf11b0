//! Outbound HTTP client.
//!
//! One `reqwest::Client` is built at startup and shared by every call. Each
//! call is bounded by `upstream.timeout_secs`; dropping the returned future
//! (inbound connection closed) abandons the call.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::relay::decode::DecodeStrategy;
use crate::relay::outbound::OutboundRequest;

/// Decoded answer from the target system.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn send(&self, outbound: OutboundRequest) -> Result<UpstreamResponse, RelayError> {
        let mut request = self
            .client
            .request(outbound.method, outbound.url)
            .headers(outbound.headers);
        if let Some(body) = outbound.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(RelayError::from_reqwest)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await.map_err(RelayError::from_reqwest)?;
        let payload = DecodeStrategy::for_content_type(content_type.as_deref()).decode(&bytes)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            payload,
        })
    }
}
