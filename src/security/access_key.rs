//! Relay access-key enforcement.
//!
//! The relay holds third-party credentials on behalf of callers, so callers
//! must present the relay's own key. With enforcement on and no key
//! configured, every call is rejected.

use axum::http::{HeaderMap, HeaderName};

use crate::error::RelayError;

#[derive(Debug, Clone)]
pub struct AccessKeyPolicy {
    enforce: bool,
    header: HeaderName,
    expected: Option<String>,
}

impl AccessKeyPolicy {
    pub fn new(enforce: bool, header: HeaderName, expected: Option<String>) -> Self {
        Self {
            enforce,
            header,
            expected: expected.filter(|key| !key.is_empty()),
        }
    }

    /// Policy that lets every call through.
    pub fn disabled() -> Self {
        Self::new(false, HeaderName::from_static("x-api-key"), None)
    }

    pub fn is_enforced(&self) -> bool {
        self.enforce
    }

    pub fn has_key(&self) -> bool {
        self.expected.is_some()
    }

    /// Check the inbound headers against the configured key.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), RelayError> {
        if !self.enforce {
            return Ok(());
        }

        let Some(expected) = self.expected.as_deref() else {
            return Err(RelayError::Unauthorized);
        };

        let presented = headers.get(&self.header).and_then(|v| v.to_str().ok());

        match presented {
            Some(key) if key == expected => Ok(()),
            _ => Err(RelayError::Unauthorized),
        }
    }
}
