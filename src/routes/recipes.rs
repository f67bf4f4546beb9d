use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Query;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use validator::Validate;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{AppError, AppResult};
use crate::routes::AppState;
use crate::routes::tags::Tag;
use crate::routes::users::{UserProfile, fetch_profile};

#[derive(Debug, Deserialize, Serialize)]
pub struct RecipeIngredientInput {
    pub id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, max = 150))]
    pub name: String,

    #[validate(length(min = 1))]
    pub text: String,

    #[validate(range(min = 1))]
    pub cooking_time: i64,

    #[validate(length(min = 1, message = "Add at least one ingredient"))]
    pub ingredients: Vec<RecipeIngredientInput>,

    #[validate(length(min = 1, message = "Add at least one tag"))]
    pub tags: Vec<i64>,
}

impl RecipeInput {
    /// Checks the rules `validator` cannot express: unique ingredient
    /// ids, unique tag ids, and per-line quantities of at least one.
    fn validate_relations(&self) -> AppResult<()> {
        let ingredient_ids: HashSet<i64> = self.ingredients.iter().map(|line| line.id).collect();
        if ingredient_ids.len() != self.ingredients.len() {
            return Err(AppError::Validation(
                "Ingredients must not repeat".to_string(),
            ));
        }

        let tag_ids: HashSet<i64> = self.tags.iter().copied().collect();
        if tag_ids.len() != self.tags.len() {
            return Err(AppError::Validation("Tags must not repeat".to_string()));
        }

        if self.ingredients.iter().any(|line| line.quantity < 1) {
            return Err(AppError::Validation(
                "Ingredient quantity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecipeIngredient {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserProfile,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub created_at: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub tags: Vec<Tag>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    author_id: i64,
    name: String,
    text: String,
    cooking_time: i64,
    created_at: String,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, Default)]
pub struct RecipeListQuery {
    /// Tag slug, repeatable
    #[serde(default)]
    pub tag: Vec<String>,
    pub author: Option<i64>,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub is_in_shopping_cart: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /recipes - public list with filters
pub async fn list(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Query(query): Query<RecipeListQuery>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let caller_id = caller.id_or_zero();

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT DISTINCT r.id FROM recipes r");
    if !query.tag.is_empty() {
        builder.push(" JOIN recipe_tags rt ON rt.recipe_id = r.id JOIN tags t ON t.id = rt.tag_id");
    }
    builder.push(" WHERE 1 = 1");

    if let Some(author_id) = query.author {
        builder.push(" AND r.author_id = ").push_bind(author_id);
    }
    if !query.tag.is_empty() {
        builder.push(" AND t.slug IN (");
        {
            let mut slugs = builder.separated(", ");
            for slug in &query.tag {
                slugs.push_bind(slug);
            }
        }
        builder.push(")");
    }
    // Caller-scoped filters only apply to authenticated callers;
    // anonymous callers get the unfiltered list.
    if caller.0.is_some() {
        if query.is_favorited {
            builder
                .push(" AND EXISTS(SELECT 1 FROM favorites fa WHERE fa.recipe_id = r.id AND fa.user_id = ")
                .push_bind(caller_id)
                .push(")");
        }
        if query.is_in_shopping_cart {
            builder
                .push(" AND EXISTS(SELECT 1 FROM shopping_list sl WHERE sl.recipe_id = r.id AND sl.user_id = ")
                .push_bind(caller_id)
                .push(")");
        }
    }

    builder
        .push(" ORDER BY r.id DESC LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);

    let recipe_ids: Vec<i64> = builder
        .build_query_scalar()
        .fetch_all(&state.pool)
        .await?;

    let mut recipes = Vec::with_capacity(recipe_ids.len());
    for recipe_id in recipe_ids {
        if let Some(recipe) = load_recipe(&state, recipe_id, caller_id).await? {
            recipes.push(recipe);
        }
    }

    Ok(Json(recipes))
}

/// POST /recipes - create a recipe authored by the caller
#[tracing::instrument(skip(state, auth, input), fields(user_id = auth.id))]
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<RecipeInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    input.validate_relations()?;

    let mut tx = state.pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO recipes (author_id, name, text, cooking_time, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(auth.id)
    .bind(&input.name)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await?;
    let recipe_id = result.last_insert_rowid();

    write_relations(&mut tx, recipe_id, &input).await?;
    tx.commit().await?;

    tracing::info!(user_id = auth.id, recipe_id, "recipe created");

    let recipe = load_recipe(&state, recipe_id, auth.id)
        .await?
        .ok_or(AppError::NotFound("recipe"))?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

/// GET /recipes/{id} - public detail
pub async fn detail(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(recipe_id): Path<i64>,
) -> AppResult<Json<RecipeResponse>> {
    let recipe = load_recipe(&state, recipe_id, caller.id_or_zero())
        .await?
        .ok_or(AppError::NotFound("recipe"))?;

    Ok(Json(recipe))
}

/// PUT /recipes/{id} - author-only update; ingredient lines and tags are
/// replaced wholesale.
#[tracing::instrument(skip(state, auth, input), fields(user_id = auth.id))]
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<i64>,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<RecipeResponse>> {
    input.validate()?;
    input.validate_relations()?;
    ensure_author(&state, recipe_id, &auth).await?;

    let mut tx = state.pool.begin().await?;

    sqlx::query("UPDATE recipes SET name = ?1, text = ?2, cooking_time = ?3 WHERE id = ?4")
        .bind(&input.name)
        .bind(&input.text)
        .bind(input.cooking_time)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

    write_relations(&mut tx, recipe_id, &input).await?;
    tx.commit().await?;

    let recipe = load_recipe(&state, recipe_id, auth.id)
        .await?
        .ok_or(AppError::NotFound("recipe"))?;

    Ok(Json(recipe))
}

/// DELETE /recipes/{id} - author-only; cascades to lines, favorites and
/// shopping-list entries.
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_author(&state, recipe_id, &auth).await?;

    sqlx::query("DELETE FROM recipes WHERE id = ?1")
        .bind(recipe_id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = auth.id, recipe_id, "recipe deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_author(state: &AppState, recipe_id: i64, auth: &AuthUser) -> AppResult<()> {
    let author_id: Option<(i64,)> = sqlx::query_as("SELECT author_id FROM recipes WHERE id = ?1")
        .bind(recipe_id)
        .fetch_optional(&state.pool)
        .await?;

    match author_id {
        None => Err(AppError::NotFound("recipe")),
        Some((author_id,)) if author_id != auth.id => Err(AppError::Forbidden),
        Some(_) => Ok(()),
    }
}

/// Insert ingredient lines and tag links for a recipe, verifying that
/// every referenced id exists in the catalog.
async fn write_relations(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    input: &RecipeInput,
) -> AppResult<()> {
    let ingredient_ids: Vec<i64> = input.ingredients.iter().map(|line| line.id).collect();
    if count_existing(tx, "ingredients", &ingredient_ids).await? != ingredient_ids.len() as i64 {
        return Err(AppError::Validation("Unknown ingredient".to_string()));
    }
    if count_existing(tx, "tags", &input.tags).await? != input.tags.len() as i64 {
        return Err(AppError::Validation("Unknown tag".to_string()));
    }

    for line in &input.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(recipe_id)
        .bind(line.id)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await?;
    }

    for tag_id in &input.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn count_existing(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    ids: &[i64],
) -> Result<i64, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {table} WHERE id IN ("));
    {
        let mut list = builder.separated(", ");
        for id in ids {
            list.push_bind(id);
        }
    }
    builder.push(")");

    builder.build_query_scalar().fetch_one(&mut **tx).await
}

pub(crate) async fn recipe_exists(state: &AppState, recipe_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?1)")
        .bind(recipe_id)
        .fetch_one(&state.pool)
        .await
}

async fn load_recipe(
    state: &AppState,
    recipe_id: i64,
    caller_id: i64,
) -> AppResult<Option<RecipeResponse>> {
    let Some(recipe) = sqlx::query_as::<_, RecipeRow>(
        "SELECT id, author_id, name, text, cooking_time, created_at FROM recipes WHERE id = ?1",
    )
    .bind(recipe_id)
    .fetch_optional(&state.pool)
    .await?
    else {
        return Ok(None);
    };

    let author = fetch_profile(state, caller_id, recipe.author_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let ingredients = sqlx::query_as::<_, RecipeIngredient>(
        "SELECT i.id, i.name, i.unit, ri.quantity \
         FROM recipe_ingredients ri \
         JOIN ingredients i ON i.id = ri.ingredient_id \
         WHERE ri.recipe_id = ?1 ORDER BY i.name",
    )
    .bind(recipe_id)
    .fetch_all(&state.pool)
    .await?;

    let tags = sqlx::query_as::<_, Tag>(
        "SELECT t.id, t.name, t.slug, t.color \
         FROM tags t \
         JOIN recipe_tags rt ON rt.tag_id = t.id \
         WHERE rt.recipe_id = ?1 ORDER BY t.id",
    )
    .bind(recipe_id)
    .fetch_all(&state.pool)
    .await?;

    let (is_favorited, is_in_shopping_cart): (bool, bool) = sqlx::query_as(
        "SELECT \
         EXISTS(SELECT 1 FROM favorites fa WHERE fa.user_id = ?1 AND fa.recipe_id = ?2), \
         EXISTS(SELECT 1 FROM shopping_list sl WHERE sl.user_id = ?1 AND sl.recipe_id = ?2)",
    )
    .bind(caller_id)
    .bind(recipe_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Some(RecipeResponse {
        id: recipe.id,
        author,
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        created_at: recipe.created_at,
        ingredients,
        tags,
        is_favorited,
        is_in_shopping_cart,
    }))
}
