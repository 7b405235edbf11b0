//! Forwarding method resolution.

use reqwest::Method;

use crate::error::RelayError;

/// What to forward with when the caller gives no `method` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFallback {
    /// Mirror the inbound HTTP method.
    Inbound,
    /// Use a fixed method.
    Fixed(Method),
}

impl Default for MethodFallback {
    fn default() -> Self {
        MethodFallback::Inbound
    }
}

/// Parse a method name case-insensitively. Empty or whitespace-only is `None`.
pub fn parse_method(raw: &str) -> Result<Option<Method>, RelayError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map(Some)
        .map_err(|_| RelayError::InvalidMethod(format!("`{raw}` is not a valid HTTP method")))
}

/// Override wins, then the fallback policy.
pub fn resolve_method(
    requested: Option<&str>,
    inbound: &Method,
    fallback: &MethodFallback,
) -> Result<Method, RelayError> {
    if let Some(method) = requested.map(parse_method).transpose()?.flatten() {
        return Ok(method);
    }

    Ok(match fallback {
        MethodFallback::Inbound => inbound.clone(),
        MethodFallback::Fixed(method) => method.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_uppercased_and_wins() {
        let method = resolve_method(Some(" patch "), &Method::POST, &MethodFallback::Inbound).unwrap();
        assert_eq!(method, Method::PATCH);
    }

    #[test]
    fn inbound_fallback_mirrors_method() {
        let method = resolve_method(None, &Method::PUT, &MethodFallback::Inbound).unwrap();
        assert_eq!(method, Method::PUT);

        let method = resolve_method(Some(""), &Method::GET, &MethodFallback::Inbound).unwrap();
        assert_eq!(method, Method::GET);
    }

    #[test]
    fn fixed_fallback_ignores_inbound() {
        let fallback = MethodFallback::Fixed(Method::POST);
        let method = resolve_method(None, &Method::GET, &fallback).unwrap();
        assert_eq!(method, Method::POST);
    }

    #[test]
    fn default_fallback_mirrors_inbound() {
        let method = resolve_method(None, &Method::DELETE, &MethodFallback::default()).unwrap();
        assert_eq!(method, Method::DELETE);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let err = resolve_method(Some("GE T"), &Method::GET, &MethodFallback::Inbound).unwrap_err();
        assert!(matches!(err, RelayError::InvalidMethod(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
