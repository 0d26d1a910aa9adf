use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Liveness probe: `GET /healthz`.
pub async fn healthz() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "message": "OK" })))
}

/// Readiness probe: `GET /readyz`.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
