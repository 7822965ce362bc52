//! Liveness and health endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api", get(alive))
        .route("/api/health", get(health))
}

async fn alive() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    database: bool,
    migrations_applied: usize,
    migrations_total: usize,
}

/// 200 when the store answers and every migration is applied, else 503.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;

    let (migrations_total, migrations_applied) = if database {
        state.db.migration_status().await.unwrap_or_else(|e| {
            warn!(error = %e, "Migration status unavailable");
            (0, 0)
        })
    } else {
        (0, 0)
    };

    let healthy = database && migrations_applied == migrations_total;
    let report = HealthReport {
        status: if healthy { "ok" } else { "degraded" },
        database,
        migrations_applied,
        migrations_total,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}
