use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::auth::{AuthUser, MaybeAuthUser, generate_token, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::routes::AppState;

/// Select a user profile plus the caller-specific is_subscribed flag.
/// ?1 is always the caller id (0 when anonymous).
const USER_SELECT: &str = "SELECT u.id, u.username, u.email, u.first_name, u.last_name, \
     EXISTS(SELECT 1 FROM follows f WHERE f.user_id = ?1 AND f.author_id = u.id) AS is_subscribed \
     FROM users u";

#[derive(Debug, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 70))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 70))]
    pub first_name: String,

    #[validate(length(max = 70))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// POST /users - register a new account
#[tracing::instrument(skip(state, input))]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let password_hash = hash_password(&input.password)?;

    let result = sqlx::query(
        "INSERT INTO users (username, email, first_name, last_name, password_hash, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&password_hash)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.pool)
    .await
    .map_err(|e| {
        AppError::on_unique_violation(e, "A user with this username or email already exists")
    })?;

    let user_id = result.last_insert_rowid();
    tracing::info!(user_id, "registered new user");

    let profile = fetch_profile(&state, 0, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /auth/login - exchange credentials for a JWT
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<TokenResponse>> {
    let row =
        sqlx::query_as::<_, (i64, String)>("SELECT id, password_hash FROM users WHERE email = ?1")
            .bind(&input.email)
            .fetch_optional(&state.pool)
            .await?;

    let (user_id, password_hash) = row.ok_or(AppError::Unauthorized)?;

    if !verify_password(&input.password, &password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = generate_token(&state.config.jwt, user_id.to_string())?;

    Ok(Json(TokenResponse { token }))
}

/// GET /users/me - the caller's own profile
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserProfile>> {
    let profile = fetch_profile(&state, auth.id, auth.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordInput {
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// POST /users/change-password
#[tracing::instrument(skip(state, input))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let (password_hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = ?1")
            .bind(auth.id)
            .fetch_one(&state.pool)
            .await?;

    if !verify_password(&input.current_password, &password_hash) {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = hash_password(&input.new_password)?;
    sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(&new_hash)
        .bind(auth.id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = auth.id, "password changed");

    Ok(Json(serde_json::json!({ "status": "password changed" })))
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /users - public listing
pub async fn list(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = sqlx::query_as::<_, UserProfile>(&format!(
        "{USER_SELECT} ORDER BY u.id LIMIT ?2 OFFSET ?3"
    ))
    .bind(caller.id_or_zero())
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(users))
}

/// GET /users/{id} - public detail
pub async fn detail(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let profile = fetch_profile(&state, caller.id_or_zero(), user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(profile))
}

/// POST /users/{id}/subscribe - follow an author
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(author_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    if author_id == auth.id {
        return Err(AppError::Validation(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    if fetch_profile(&state, auth.id, author_id).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }

    sqlx::query("INSERT INTO follows (user_id, author_id, created_at) VALUES (?1, ?2, ?3)")
        .bind(auth.id)
        .bind(author_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&state.pool)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(e, "You are already subscribed to this author")
        })?;

    let author = fetch_profile(&state, auth.id, author_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok((StatusCode::CREATED, Json(author)))
}

/// DELETE /users/{id}/subscribe - unfollow an author
#[tracing::instrument(skip(state, auth), fields(user_id = auth.id))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(author_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2")
        .bind(auth.id)
        .bind(author_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("subscription"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/subscriptions - authors the caller follows
pub async fn subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<UserProfile>>> {
    let authors = sqlx::query_as::<_, UserProfile>(&format!(
        "{USER_SELECT} JOIN follows fo ON fo.author_id = u.id \
         WHERE fo.user_id = ?1 ORDER BY u.id"
    ))
    .bind(auth.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(authors))
}

pub(crate) async fn fetch_profile(
    state: &AppState,
    caller_id: i64,
    user_id: i64,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!("{USER_SELECT} WHERE u.id = ?2"))
        .bind(caller_id)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await
}
