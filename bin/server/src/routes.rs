//! HTTP routes for the relay server.
//!
//! Thin adapter over [`Gateway`]: routes deserialize nothing themselves,
//! handing the raw JSON document to the pipeline and mapping its outcome
//! onto a status code and a user-safe body. Error responses never carry
//! upstream payloads beyond the bounded detail the pipeline already
//! produced, and never the credential.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use prompt_relay_gateway::{Gateway, GatewayError};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Builds the application router around a configured gateway.
pub fn router(gateway: Arc<Gateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/generate", post(generate))
        .route("/health", get(health))
        .layer(cors)
        .with_state(gateway)
}

/// `POST /api/generate` — run one invocation.
///
/// The body is parsed here rather than by an extractor so every failure,
/// including a malformed body or a missing Content-Type, answers with the
/// same structured error object.
///
/// A body of `{"ping": true}` is a connectivity probe: it answers without
/// touching upstream, so monitors can verify the route cheaply.
async fn generate(State(gateway): State<Arc<Gateway>>, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return error_response(&GatewayError::InvalidRequest {
                reason: format!("request body is not valid JSON: {err}"),
            });
        }
    };

    if body.get("ping").and_then(Value::as_bool) == Some(true) {
        return Json(json!({
            "ok": true,
            "ts": chrono::Utc::now().to_rfc3339(),
        }))
        .into_response();
    }

    match gateway.invoke(&body).await {
        Ok(text) => Json(json!({ "text": text })).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `GET /health` — liveness probe.
async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "prompt-relay-server",
        "ts": chrono::Utc::now().to_rfc3339(),
    }))
}

fn error_response(err: &GatewayError) -> Response {
    tracing::warn!(error = %err, "invocation failed");

    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = json!({ "error": err.user_message() });
    if let Some(detail) = err.detail() {
        body["details"] = Value::String(detail.to_string());
    }
    (status, Json(body)).into_response()
}
