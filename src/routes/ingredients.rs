use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

/// Catalog ingredient. Reference data, administered out of band.
#[derive(Debug, Serialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}

/// LIKE treats % and _ as wildcards; the filter is a literal prefix.
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// GET /ingredients?name=<prefix>
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    let ingredients = match query.name {
        Some(prefix) => {
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, unit FROM ingredients WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name",
            )
            .bind(format!("{}%", escape_like(&prefix)))
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ingredient>("SELECT id, name, unit FROM ingredients ORDER BY name")
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(Json(ingredients))
}

/// GET /ingredients/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> AppResult<Json<Ingredient>> {
    let ingredient =
        sqlx::query_as::<_, Ingredient>("SELECT id, name, unit FROM ingredients WHERE id = ?1")
            .bind(ingredient_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::NotFound("ingredient"))?;

    Ok(Json(ingredient))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100% rye"), "100\\% rye");
        assert_eq!(escape_like("sea_salt"), "sea\\_salt");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("flour"), "flour");
    }
}
