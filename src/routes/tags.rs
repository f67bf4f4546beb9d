use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

/// Recipe category tag. Reference data, administered out of band.
#[derive(Debug, Serialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
}

/// GET /tags
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug, color FROM tags ORDER BY id")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(tags))
}

/// GET /tags/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> AppResult<Json<Tag>> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug, color FROM tags WHERE id = ?1")
        .bind(tag_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("tag"))?;

    Ok(Json(tag))
}
