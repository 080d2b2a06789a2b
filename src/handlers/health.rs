use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// GET /health -> liveness probe. Does not touch the store.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
