use axum::{
    Router,
    routing::{get, post},
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

mod favorites;
mod health;
mod ingredients;
mod recipes;
mod shopping_list;
mod tags;
mod users;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub pool: SqlitePool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.pool.clone())
        .merge(
            Router::new()
                .route("/auth/login", post(users::login))
                .route("/users", post(users::register).get(users::list))
                .route("/users/me", get(users::me))
                .route("/users/change-password", post(users::change_password))
                .route("/users/subscriptions", get(users::subscriptions))
                .route("/users/{id}", get(users::detail))
                .route(
                    "/users/{id}/subscribe",
                    post(users::subscribe).delete(users::unsubscribe),
                )
                .route("/tags", get(tags::list))
                .route("/tags/{id}", get(tags::detail))
                .route("/ingredients", get(ingredients::list))
                .route("/ingredients/{id}", get(ingredients::detail))
                .route("/recipes", get(recipes::list).post(recipes::create))
                .route(
                    "/recipes/download-shopping-list",
                    get(shopping_list::download),
                )
                .route(
                    "/recipes/{id}",
                    get(recipes::detail)
                        .put(recipes::update)
                        .delete(recipes::delete),
                )
                .route(
                    "/recipes/{id}/favorite",
                    post(favorites::add).delete(favorites::remove),
                )
                .route(
                    "/recipes/{id}/shopping-cart",
                    post(shopping_list::add).delete(shopping_list::remove),
                )
                .with_state(state),
        )
        .layer(TraceLayer::new_for_http())
}
