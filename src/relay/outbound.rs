//! Outbound request construction.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Map;
use url::Url;

use crate::error::RelayError;
use crate::relay::params::RelayParams;
use crate::relay::query::append_query;

/// How the effective token is attached to the outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialScheme {
    /// Raw token under a named header, e.g. `Access-Token: <token>`.
    Header(HeaderName),
    /// `Authorization: Bearer <token>`.
    Bearer,
}

impl Default for CredentialScheme {
    fn default() -> Self {
        CredentialScheme::Header(HeaderName::from_static("access-token"))
    }
}

impl CredentialScheme {
    pub fn header_name(&self) -> &HeaderName {
        match self {
            CredentialScheme::Header(name) => name,
            CredentialScheme::Bearer => &AUTHORIZATION,
        }
    }

    /// Insert the credential. An empty token inserts nothing.
    pub fn apply(&self, headers: &mut HeaderMap, token: &str) -> Result<(), RelayError> {
        if token.is_empty() {
            return Ok(());
        }

        let mut value = match self {
            CredentialScheme::Header(_) => HeaderValue::from_str(token),
            CredentialScheme::Bearer => HeaderValue::from_str(&format!("Bearer {token}")),
        }
        .map_err(|_| RelayError::InvalidToken)?;
        value.set_sensitive(true);
        headers.insert(self.header_name().clone(), value);
        Ok(())
    }
}

/// A fully built upstream call.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Serialized JSON payload; `None` for GET.
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    pub fn build(
        params: &RelayParams,
        method: Method,
        credential: &CredentialScheme,
    ) -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        credential.apply(&mut headers, &params.token)?;

        let mut url = Url::parse(&params.url)?;

        let body = if method == Method::GET {
            if let Some(body) = &params.body {
                append_query(&mut url, body);
            }
            None
        } else {
            let empty = Map::new();
            let payload = params.body.as_ref().unwrap_or(&empty);
            Some(
                serde_json::to_vec(payload)
                    .map_err(|e| RelayError::Transport(format!("failed to serialize body: {e}")))?,
            )
        };

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }
}
