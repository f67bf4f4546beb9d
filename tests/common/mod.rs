#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use tastebook::config::{Config, DatabaseConfig, JwtConfig, LogConfig, ServerConfig};

pub const PASSWORD: &str = "password123";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_string(),
            issuer: "tastebook".to_string(),
            audience: "tastebook".to_string(),
            expiration_days: 7,
        },
        log: LogConfig::default(),
    }
}

/// Build the app against a fresh in-memory database.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");

    sqlx::query("PRAGMA foreign_keys = true")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let app = tastebook::create_app(pool.clone(), test_config());
    (app, pool)
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("JSON body")
}

pub async fn register(app: &Router, username: &str, email: &str) -> i64 {
    let response = request(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "first_name": "Test",
            "last_name": "User",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["id"].as_i64().unwrap()
}

pub async fn login(app: &Router, email: &str) -> String {
    let response = request(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["token"].as_str().unwrap().to_string()
}

pub async fn register_and_login(app: &Router, username: &str, email: &str) -> String {
    register(app, username, email).await;
    login(app, email).await
}

/// Seed the reference catalog the way an operator would, directly in
/// the database. Ids are stable: tags 1-2, ingredients 1-4.
pub async fn seed_catalog(pool: &SqlitePool) {
    for (name, slug, color) in [
        ("Breakfast", "breakfast", Some("#E26C2D")),
        ("Dinner", "dinner", None),
    ] {
        sqlx::query("INSERT INTO tags (name, slug, color) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(slug)
            .bind(color)
            .execute(pool)
            .await
            .unwrap();
    }

    for (name, unit) in [("flour", "g"), ("sugar", "g"), ("egg", "pcs"), ("milk", "ml")] {
        sqlx::query("INSERT INTO ingredients (name, unit) VALUES (?1, ?2)")
            .bind(name)
            .bind(unit)
            .execute(pool)
            .await
            .unwrap();
    }
}

pub async fn create_recipe(
    app: &Router,
    token: &str,
    name: &str,
    ingredients: Value,
    tags: Value,
) -> i64 {
    let response = request(
        app,
        Method::POST,
        "/recipes",
        Some(token),
        Some(json!({
            "name": name,
            "text": "Mix everything and bake.",
            "cooking_time": 30,
            "ingredients": ingredients,
            "tags": tags,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["id"].as_i64().unwrap()
}
