use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::routes::AppState;
use crate::routes::recipes::recipe_exists;

/// Short recipe representation returned when a recipe is added to a
/// per-user collection.
#[derive(Debug, Serialize, FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub cooking_time: i64,
}

/// POST /recipes/{id}/favorite
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    if !recipe_exists(&state, recipe_id).await? {
        return Err(AppError::NotFound("recipe"));
    }

    sqlx::query("INSERT INTO favorites (user_id, recipe_id, created_at) VALUES (?1, ?2, ?3)")
        .bind(auth.id)
        .bind(recipe_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&state.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Recipe is already in favorites"))?;

    let summary = recipe_summary(&state, recipe_id).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /recipes/{id}/favorite
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<i64>,
) -> AppResult<StatusCode> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ?1 AND recipe_id = ?2")
        .bind(auth.id)
        .bind(recipe_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("favorite"));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn recipe_summary(
    state: &AppState,
    recipe_id: i64,
) -> AppResult<RecipeSummary> {
    sqlx::query_as::<_, RecipeSummary>(
        "SELECT id, name, cooking_time FROM recipes WHERE id = ?1",
    )
    .bind(recipe_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("recipe"))
}
