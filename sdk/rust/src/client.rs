use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One call to forward through the relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayCall {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "Access-Token", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
}

impl RelayCall {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Payload to forward. Anything but a JSON object is ignored.
    pub fn body(mut self, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.body = Some(map);
        }
        self
    }
}

/// Status and JSON value returned by the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    pub status: StatusCode,
    pub body: Value,
}

impl RelayOutcome {
    /// `error` field of a relay error body.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
    api_key: Option<String>,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            relay_url: relay_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Access key sent as `x-api-key` on every relay call.
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Send a relay call with the given inbound HTTP method.
    pub async fn relay_with(
        &self,
        method: reqwest::Method,
        call: &RelayCall,
    ) -> Result<RelayOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut request = self
            .client
            .request(method, format!("{}/relay", self.relay_url))
            .json(call);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(RelayOutcome { status, body })
    }

    /// Send a relay call as `POST /relay`.
    pub async fn relay(
        &self,
        call: &RelayCall,
    ) -> Result<RelayOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.relay_with(reqwest::Method::POST, call).await
    }

    pub async fn health(&self) -> Result<Value, reqwest::Error> {
        self.client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?
            .json()
            .await
    }
}
