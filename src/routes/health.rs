use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

/// GET /health - liveness probe, answers as long as the process runs.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /ready - readiness probe, verifies the database answers queries.
pub async fn ready(State(pool): State<SqlitePool>) -> impl IntoResponse {
    if let Err(e) = sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
        tracing::error!("readiness probe failed: {e}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "reason": "database_unavailable" })),
        );
    }

    (StatusCode::OK, Json(json!({ "status": "ready" })))
}
