use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{
    body_json, create_recipe, register_and_login, request, seed_catalog, setup_app,
};

#[tokio::test]
async fn favorite_returns_short_representation_and_sets_flag() {
    let (app, pool) = setup_app().await;
    seed_catalog(&pool).await;
    let token = register_and_login(&app, "alice", "alice@example.com").await;
    let recipe_id =
        create_recipe(&app, &token, "Pancakes", json!([{ "id": 1, "quantity": 100 }]), json!([1]))
            .await;

    let response = request(
        &app,
        Method::POST,
        &format!("/recipes/{recipe_id}/favorite"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let summary = body_json(response).await;
    assert_eq!(summary["id"], recipe_id);
    assert_eq!(summary["name"], "Pancakes");
    assert_eq!(summary["cooking_time"], 30);
    assert!(summary.get("text").is_none());

    let response = request(&app, Method::GET, &format!("/recipes/{recipe_id}"), Some(&token), None)
        .await;
    assert_eq!(body_json(response).await["is_favorited"], true);
}

#[tokio::test]
async fn favorite_twice_is_rejected() {
    let (app, pool) = setup_app().await;
    seed_catalog(&pool).await;
    let token = register_and_login(&app, "alice", "alice@example.com").await;
    let recipe_id =
        create_recipe(&app, &token, "Pancakes", json!([{ "id": 1, "quantity": 100 }]), json!([1]))
            .await;

    let uri = format!("/recipes/{recipe_id}/favorite");
    request(&app, Method::POST, &uri, Some(&token), None).await;

    let response = request(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn favorite_unknown_recipe_is_not_found() {
    let (app, pool) = setup_app().await;
    seed_catalog(&pool).await;
    let token = register_and_login(&app, "alice", "alice@example.com").await;

    let response = request(&app, Method::POST, "/recipes/999/favorite", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unfavorite_removes_the_entry() {
    let (app, pool) = setup_app().await;
    seed_catalog(&pool).await;
    let token = register_and_login(&app, "alice", "alice@example.com").await;
    let recipe_id =
        create_recipe(&app, &token, "Pancakes", json!([{ "id": 1, "quantity": 100 }]), json!([1]))
            .await;

    let uri = format!("/recipes/{recipe_id}/favorite");
    request(&app, Method::POST, &uri, Some(&token), None).await;

    let response = request(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = request(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_are_per_user() {
    let (app, pool) = setup_app().await;
    seed_catalog(&pool).await;
    let alice = register_and_login(&app, "alice", "alice@example.com").await;
    let bob = register_and_login(&app, "bob", "bob@example.com").await;
    let recipe_id =
        create_recipe(&app, &alice, "Pancakes", json!([{ "id": 1, "quantity": 100 }]), json!([1]))
            .await;

    request(
        &app,
        Method::POST,
        &format!("/recipes/{recipe_id}/favorite"),
        Some(&alice),
        None,
    )
    .await;

    let response = request(&app, Method::GET, &format!("/recipes/{recipe_id}"), Some(&bob), None)
        .await;
    assert_eq!(body_json(response).await["is_favorited"], false);
}

#[tokio::test]
async fn list_filter_is_favorited_scopes_to_caller() {
    let (app, pool) = setup_app().await;
    seed_catalog(&pool).await;
    let token = register_and_login(&app, "alice", "alice@example.com").await;
    let favorite_id =
        create_recipe(&app, &token, "Pancakes", json!([{ "id": 1, "quantity": 100 }]), json!([1]))
            .await;
    create_recipe(&app, &token, "Stew", json!([{ "id": 2, "quantity": 50 }]), json!([2])).await;

    request(
        &app,
        Method::POST,
        &format!("/recipes/{favorite_id}/favorite"),
        Some(&token),
        None,
    )
    .await;

    let response = request(&app, Method::GET, "/recipes?is_favorited=true", Some(&token), None)
        .await;
    let recipes = body_json(response).await;
    let recipes = recipes.as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["name"], "Pancakes");

    // Anonymous callers have no favorites to scope to, so the filter
    // has no effect and the full list comes back
    let response = request(&app, Method::GET, "/recipes?is_favorited=true", None, None).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}
