use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::prelude::FromRow;
use tastebook_shopping::{IngredientLine, aggregate, render_pdf, render_text};

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::routes::AppState;
use crate::routes::favorites::recipe_summary;
use crate::routes::recipes::recipe_exists;

/// POST /recipes/{id}/shopping-cart
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    if !recipe_exists(&state, recipe_id).await? {
        return Err(AppError::NotFound("recipe"));
    }

    sqlx::query("INSERT INTO shopping_list (user_id, recipe_id, created_at) VALUES (?1, ?2, ?3)")
        .bind(auth.id)
        .bind(recipe_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&state.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Recipe is already on the shopping list"))?;

    let summary = recipe_summary(&state, recipe_id).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /recipes/{id}/shopping-cart
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<i64>,
) -> AppResult<StatusCode> {
    let result = sqlx::query("DELETE FROM shopping_list WHERE user_id = ?1 AND recipe_id = ?2")
        .bind(auth.id)
        .bind(recipe_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("shopping-list entry"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Txt,
    Pdf,
}

#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    #[serde(default)]
    pub format: Format,
}

#[derive(Debug, FromRow)]
struct LineRow {
    ingredient_id: i64,
    name: String,
    unit: String,
    quantity: i64,
}

/// GET /recipes/download-shopping-list?format=txt|pdf
///
/// Aggregates the ingredient lines of every recipe on the caller's
/// shopping list and returns them as a downloadable document.
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    let rows = sqlx::query_as::<_, LineRow>(
        "SELECT i.id AS ingredient_id, i.name, i.unit, ri.quantity \
         FROM shopping_list sl \
         JOIN recipe_ingredients ri ON ri.recipe_id = sl.recipe_id \
         JOIN ingredients i ON i.id = ri.ingredient_id \
         WHERE sl.user_id = ?1",
    )
    .bind(auth.id)
    .fetch_all(&state.pool)
    .await?;

    let summary = aggregate(rows.into_iter().map(|row| IngredientLine {
        ingredient_id: row.ingredient_id,
        name: row.name,
        unit: row.unit,
        quantity: row.quantity,
    }));

    for conflict in &summary.conflicts {
        tracing::warn!(
            ingredient_id = conflict.ingredient_id,
            name = %conflict.name,
            kept = %conflict.kept,
            ignored = %conflict.ignored,
            "unit mismatch while aggregating shopping list"
        );
    }

    let (content_type, filename, body) = match query.format {
        Format::Txt => (
            "text/plain; charset=utf-8",
            "shopping_list.txt",
            render_text(&summary.lines).into_bytes(),
        ),
        Format::Pdf => (
            "application/pdf",
            "shopping_list.pdf",
            render_pdf(&summary.lines),
        ),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}
