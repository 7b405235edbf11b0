//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay, liveness and health handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout)
//! - Enforce the body size limit while reading the relay body
//! - Render timeouts and body-read failures as JSON errors
//! - Bind server to listener and serve until shutdown
//! - Log and measure every relay call

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{any, get},
    BoxError, Router,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::error::{ErrorCategory, RelayError};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::relay::{Relay, RelayPolicy, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub max_body_bytes: usize,
}

/// Failure while assembling the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let policy = RelayPolicy::from_config(&config.relay)?;
        if policy.access.is_enforced() && !policy.access.has_key() {
            tracing::warn!("Access key enforcement is on but no key is configured; every relay call will be rejected");
        }

        let upstream = UpstreamClient::new(&config.upstream)?;

        let state = AppState {
            relay: Arc::new(Relay::new(policy, upstream)),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/relay", any(relay_handler))
            .route("/health", get(response::health))
            .route("/", get(response::liveness))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_layer_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            );

        let router = if config.cors.enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        };

        router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Render middleware failures as JSON relay errors.
async fn handle_layer_error(err: BoxError) -> Response {
    let err = if err.is::<Elapsed>() {
        RelayError::RequestTimeout("no response within the inbound request timeout".into())
    } else {
        RelayError::Internal(err.to_string())
    };
    tracing::warn!(error = %err, details = ?err.details(), "Request aborted by middleware");
    err.into_response()
}

/// Buffer the relay body, distinguishing an over-limit body from a broken one.
async fn read_body(body: Body, limit: usize) -> Result<axum::body::Bytes, RelayError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(RelayError::PayloadTooLarge(e.to_string())),
        Err(e) => Err(RelayError::InvalidBody(format!("failed to read request body: {e}"))),
    }
}

/// Relay handler: reads the body, runs the relay pipeline, renders the result.
async fn relay_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers).to_string();

    tracing::info!(
        request_id = %request_id,
        client = %addr,
        method = %method,
        "Relay request received"
    );

    let result = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => state.relay.relay(&method, &headers, &bytes).await,
        Err(e) => Err(e),
    };

    let response = match result {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            match err.category() {
                ErrorCategory::Upstream => {
                    tracing::error!(request_id = %request_id, error = %err, details = ?err.details(), "Relay failed");
                    metrics::record_upstream_error(match err {
                        RelayError::Timeout(_) => "timeout",
                        RelayError::MalformedResponse(_) => "decode",
                        RelayError::InvalidMethod(_) | RelayError::InvalidToken => "build",
                        _ => "transport",
                    });
                }
                _ => tracing::warn!(request_id = %request_id, error = %err, "Relay rejected"),
            }
            err.into_response()
        }
    };

    tracing::info!(
        request_id = %request_id,
        status = response.status().as_u16(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Relay request completed"
    );
    metrics::record_relay(method.as_str(), response.status().as_u16(), start_time);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode};
    use futures_util::stream;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server(configure: impl FnOnce(&mut RelayConfig)) -> Router {
        let mut config = RelayConfig::default();
        config.relay.access_key = Some("relay-key".into());
        config.upstream.use_system_proxy = false;
        configure(&mut config);

        HttpServer::new(config)
            .unwrap()
            .router()
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn relay_request(key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/relay")
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn liveness_is_plain_text() {
        let res = server(|_| {})
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], response::LIVENESS_TEXT.as_bytes());
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (status, _, body) =
            call(server(|_| {}), Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized() {
        let (status, _, body) = call(
            server(|_| {}),
            relay_request(Some("nope"), json!({ "url": "http://x.test", "token": "t" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized: invalid API key");
    }

    #[tokio::test]
    async fn unset_key_rejects_everything() {
        let (status, _, _) = call(
            server(|c| c.relay.access_key = None),
            relay_request(Some(""), json!({ "url": "http://x.test", "token": "t" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_url_is_bad_request() {
        let (status, _, body) =
            call(server(|_| {}), relay_request(Some("relay-key"), json!({ "token": "t" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "URL is required");
    }

    #[tokio::test]
    async fn missing_token_is_bad_request() {
        let (status, _, body) = call(
            server(|_| {}),
            relay_request(Some("relay-key"), json!({ "url": "http://x.test", "token": "\r\n " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Token is required");
    }

    #[tokio::test]
    async fn enforcement_can_be_disabled() {
        let (status, _, body) = call(
            server(|c| c.relay.enforce_access_key = false),
            relay_request(None, json!({})),
        )
        .await;

        // Passed the key check, stopped at validation.
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "URL is required");
    }

    #[tokio::test]
    async fn empty_body_is_treated_as_empty_mapping() {
        let request = Request::post("/relay")
            .header("x-api-key", "relay-key")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = call(server(|_| {}), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "URL is required");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_as_json() {
        let big = "x".repeat(256);
        let (status, _, body) = call(
            server(|c| c.limits.max_body_bytes = 64),
            relay_request(Some("relay-key"), json!({ "url": "http://x.test", "token": big })),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Request body too large");
    }

    #[tokio::test]
    async fn invalid_method_override_is_a_server_error() {
        let (status, _, body) = call(
            server(|c| c.relay.enforce_access_key = false),
            relay_request(
                None,
                json!({ "url": "http://127.0.0.1:9/", "token": "t", "method": "GE T" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Invalid method");
        assert!(body["details"].as_str().unwrap().contains("GE T"));
    }

    #[tokio::test]
    async fn unencodable_token_is_a_server_error() {
        let (status, _, body) = call(
            server(|c| c.relay.enforce_access_key = false),
            relay_request(None, json!({ "url": "http://127.0.0.1:9/", "token": "to\u{7f}k" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn broken_body_stream_is_bad_request() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"url\":")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let request = Request::post("/relay")
            .header("x-api-key", "relay-key")
            .body(Body::from_stream(stream::iter(chunks)))
            .unwrap();
        let (status, _, body) = call(server(|_| {}), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert!(body["details"].as_str().unwrap().contains("client went away"));
    }

    #[tokio::test]
    async fn stalled_upload_times_out_as_json() {
        let request = Request::post("/relay")
            .header("x-api-key", "relay-key")
            .body(Body::from_stream(stream::pending::<Result<Bytes, std::io::Error>>()))
            .unwrap();
        let (status, headers, body) =
            call(server(|c| c.timeouts.request_secs = 1), request).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"], "Request timed out");
        assert!(headers.contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (_, headers, _) =
            call(server(|_| {}), relay_request(Some("relay-key"), json!({}))).await;
        assert!(headers.contains_key(X_REQUEST_ID));

        let request = Request::get("/health")
            .header("x-request-id", "caller-chosen")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = call(server(|_| {}), request).await;
        assert_eq!(headers[X_REQUEST_ID], "caller-chosen");
    }

    #[tokio::test]
    async fn preflight_is_answered_when_cors_enabled() {
        let preflight = || {
            Request::builder()
                .method("OPTIONS")
                .uri("/relay")
                .header("origin", "https://app.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap()
        };

        let response = server(|_| {}).oneshot(preflight()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-origin"));

        let response = server(|c| c.cors.enabled = false)
            .oneshot(preflight())
            .await
            .unwrap();
        assert!(!response.headers().contains_key("access-control-allow-origin"));
    }
}
