//! Liveness and health endpoints.

use axum::Json;
use serde_json::{json, Value};

pub async fn home() -> &'static str {
    "Server is running"
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
