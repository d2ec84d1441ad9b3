//! Liveness probe. Constant payload, no side effects.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "AI Writing Assistant API is running"
    }))
}
