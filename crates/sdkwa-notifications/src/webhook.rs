//! HTTP receiver for notifications the gateway pushes to us.
//!
//! Bodies have the same shape as polled payloads and go through the same
//! classification and dispatch.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use sdkwa_core::config::WebhookConfig;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::notification::Notification;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::registry::CallbackRegistry;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct WebhookState {
    registry: Arc<CallbackRegistry>,
    token: Option<String>,
}

type Rejection = (StatusCode, Json<Value>);

/// Constant-time string comparison for the bearer token.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// `None` if authorized, `Some(response)` if rejected.
fn check_auth(headers: &HeaderMap, token: &Option<String>) -> Option<Rejection> {
    let expected = token.as_ref()?;

    let Some(header) = headers.get("authorization") else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing Authorization header"})),
        ));
    };

    let Ok(value) = header.to_str() else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid Authorization header"})),
        ));
    };

    match value.strip_prefix("Bearer ") {
        Some(got) if constant_time_eq(got, expected) => None,
        _ => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid token"})),
        )),
    }
}

/// `POST <path>`: classify and dispatch one notification.
async fn receive(
    headers: HeaderMap,
    State(state): State<WebhookState>,
    body: Bytes,
) -> Result<Json<Value>, Rejection> {
    if let Some(err) = check_auth(&headers, &state.token) {
        warn!("webhook: rejected unauthorized request");
        return Err(err);
    }

    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("invalid JSON: {e}")})),
        )
    })?;
    let Value::Object(map) = value else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "body must be a JSON object"})),
        ));
    };

    let notification = Notification::from_map(map);
    let kind = notification.kind();
    debug!("webhook: dispatching {kind}");

    state
        .registry
        .dispatch(&kind, &notification)
        .await
        .map_err(|e| {
            error!("webhook: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string(), "kind": kind.to_string()})),
            )
        })?;

    Ok(Json(json!({"status": "ok", "kind": kind.to_string()})))
}

/// Build the receiver router. A `path` without a leading slash gets one;
/// an empty path means `/`.
pub fn router(registry: Arc<CallbackRegistry>, path: &str, token: Option<String>) -> Router {
    let path = format!("/{}", path.trim_start_matches('/'));
    let state = WebhookState {
        registry,
        token: token.filter(|t| !t.is_empty()),
    };
    Router::new()
        .route(&path, post(receive))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Bind the configured address and serve until `cancel` fires.
pub async fn serve(
    config: &WebhookConfig,
    registry: Arc<CallbackRegistry>,
    cancel: &CancellationToken,
) -> Result<(), SdkwaError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        SdkwaError::Config(format!("webhook: failed to bind {addr}: {e}"))
    })?;
    info!("webhook: listening on {addr}{}", config.path);

    let app = router(
        registry,
        &config.path,
        config.bearer_token().map(str::to_string),
    );
    serve_listener(listener, app, cancel).await
}

/// Serve `app` on an already bound listener with graceful shutdown.
pub async fn serve_listener(
    listener: TcpListener,
    app: Router,
    cancel: &CancellationToken,
) -> Result<(), SdkwaError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await?;
    info!("webhook: stopped");
    Ok(())
}
