//! Typed relay request and its validation.
//!
//! The inbound JSON body is deserialized once into [`RelayRequest`]; a single
//! validation pass turns it into [`RelayParams`] or a specific
//! [`RelayError`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RelayError;

/// Inbound relay call as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelayRequest {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Alternate credential field, sent as `Access-Token`.
    #[serde(rename = "Access-Token")]
    pub access_token: Option<String>,
    pub body: Option<Map<String, Value>>,
    pub method: Option<String>,
}

impl RelayRequest {
    /// Parse the raw inbound body.
    ///
    /// An empty body or a JSON `null` is an empty request; anything other
    /// than a JSON object is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RelayError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| RelayError::InvalidBody(e.to_string()))?;

        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| RelayError::InvalidBody(e.to_string()))
            }
            _ => Err(RelayError::InvalidBody(
                "request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// Validated forwarding parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayParams {
    pub url: String,
    /// Sanitized token; empty only when token validation is off.
    pub token: String,
    pub body: Option<Map<String, Value>>,
    pub method: Option<String>,
}

impl RelayParams {
    pub fn validate(request: RelayRequest, require_token: bool) -> Result<Self, RelayError> {
        let url = request
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(RelayError::MissingUrl)?;

        let token = effective_token(request.token.as_deref(), request.access_token.as_deref());
        if require_token && token.is_empty() {
            return Err(RelayError::MissingToken);
        }

        Ok(Self {
            url,
            token,
            body: request.body,
            method: request.method,
        })
    }
}

/// Strip every CR/LF and trim surrounding whitespace.
pub fn sanitize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect::<String>()
        .trim()
        .to_string()
}

/// First candidate that is non-empty after sanitizing, `token` before `Access-Token`.
pub fn effective_token(token: Option<&str>, access_token: Option<&str>) -> String {
    [token, access_token]
        .into_iter()
        .flatten()
        .map(sanitize_token)
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}
