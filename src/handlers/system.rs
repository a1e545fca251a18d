// handlers/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Profiles API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "hello": "/hello/, /hello-viewset/",
            "profiles": "/profiles/[:id/]",
            "feed": "/feed/[:id/]",
            "login": "/login/",
            "health": "/health",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": backend.as_str(),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": backend.as_str(),
                    "detail": "Database temporarily unavailable",
                })),
            )
        }
    }
}
