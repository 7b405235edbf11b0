//! Relay error taxonomy and its JSON rendering.
//!
//! Every failure inside the relay pipeline is a [`RelayError`]. Nothing
//! escapes the handler: each variant maps to a status code and a JSON body
//! with at least an `error` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Broad class of a relay failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authorization,
    Validation,
    Upstream,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("URL is required")]
    MissingUrl,

    #[error("Token is required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Request body too large")]
    PayloadTooLarge(String),

    #[error("Invalid method")]
    InvalidMethod(String),

    #[error("Request timed out")]
    RequestTimeout(String),

    #[error("Internal error")]
    Internal(String),

    #[error("Upstream request failed")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Upstream request failed")]
    Transport(String),

    #[error("Upstream request timed out")]
    Timeout(String),

    #[error("Malformed upstream response")]
    MalformedResponse(String),
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::Unauthorized => ErrorCategory::Authorization,
            RelayError::MissingUrl
            | RelayError::MissingToken
            | RelayError::InvalidBody(_)
            | RelayError::PayloadTooLarge(_)
            | RelayError::RequestTimeout(_) => ErrorCategory::Validation,
            // The outbound call could not be built from what the caller sent.
            RelayError::InvalidMethod(_)
            | RelayError::InvalidToken
            | RelayError::InvalidUrl(_)
            | RelayError::Internal(_)
            | RelayError::Transport(_)
            | RelayError::Timeout(_)
            | RelayError::MalformedResponse(_) => ErrorCategory::Upstream,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            _ => match self.category() {
                ErrorCategory::Authorization => StatusCode::UNAUTHORIZED,
                ErrorCategory::Validation => StatusCode::BAD_REQUEST,
                ErrorCategory::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Best-effort description of the underlying fault, if there is one.
    pub fn details(&self) -> Option<String> {
        match self {
            RelayError::InvalidBody(d)
            | RelayError::PayloadTooLarge(d)
            | RelayError::InvalidMethod(d)
            | RelayError::RequestTimeout(d)
            | RelayError::Internal(d)
            | RelayError::Transport(d)
            | RelayError::Timeout(d)
            | RelayError::MalformedResponse(d) => Some(d.clone()),
            RelayError::InvalidUrl(e) => Some(format!("invalid target URL: {e}")),
            _ => None,
        }
    }

    /// Classify a reqwest failure.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        // Display stops at "error sending request for url"; append the causes.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        if err.is_timeout() {
            RelayError::Timeout(message)
        } else {
            RelayError::Transport(message)
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        Self {
            error: err.to_string(),
            details: err.details(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from(&self))).into_response()
    }
}
