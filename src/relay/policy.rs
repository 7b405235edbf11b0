//! Relay policy: the per-deployment switches of the relay handler.

use reqwest::header::HeaderName;

use crate::config::{ConfigError, CredentialSchemeKind, MethodFallbackKind, RelayPolicyConfig};
use crate::config::ValidationError;
use crate::relay::method::{parse_method, MethodFallback};
use crate::relay::outbound::CredentialScheme;
use crate::security::AccessKeyPolicy;

#[derive(Debug, Clone)]
pub struct RelayPolicy {
    pub access: AccessKeyPolicy,
    pub credential: CredentialScheme,
    pub method_fallback: MethodFallback,
    pub passthrough_status: bool,
    pub require_token: bool,
}

impl Default for RelayPolicy {
    /// Open relay: no access key, `Access-Token` credential, mirror inbound method.
    fn default() -> Self {
        Self {
            access: AccessKeyPolicy::disabled(),
            credential: CredentialScheme::default(),
            method_fallback: MethodFallback::Inbound,
            passthrough_status: true,
            require_token: true,
        }
    }
}

impl RelayPolicy {
    pub fn from_config(config: &RelayPolicyConfig) -> Result<Self, ConfigError> {
        let header = |field: &'static str, value: &str| {
            HeaderName::from_bytes(value.as_bytes()).map_err(|_| {
                ConfigError::Validation(vec![ValidationError::InvalidHeaderName {
                    field,
                    value: value.to_string(),
                }])
            })
        };

        let access = AccessKeyPolicy::new(
            config.enforce_access_key,
            header("relay.access_key_header", &config.access_key_header)?,
            config.access_key.clone(),
        );

        let credential = match config.credential_scheme {
            CredentialSchemeKind::Header => CredentialScheme::Header(header(
                "relay.credential_header",
                &config.credential_header,
            )?),
            CredentialSchemeKind::Bearer => CredentialScheme::Bearer,
        };

        let method_fallback = match config.method_fallback {
            MethodFallbackKind::Inbound => MethodFallback::Inbound,
            MethodFallbackKind::Default => {
                let invalid = || {
                    ConfigError::Validation(vec![ValidationError::InvalidMethod(
                        config.default_method.clone(),
                    )])
                };
                let method = parse_method(&config.default_method)
                    .map_err(|_| invalid())?
                    .ok_or_else(invalid)?;
                MethodFallback::Fixed(method)
            }
        };

        Ok(Self {
            access,
            credential,
            method_fallback,
            passthrough_status: config.passthrough_status,
            require_token: config.require_token,
        })
    }
}
