pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod observability;
pub mod routes;

pub use routes::AppState;

/// Create the app router for a given pool and configuration.
///
/// Used by the `serve` command and by integration tests, which run the
/// router against an in-memory database without binding a socket.
pub fn create_app(pool: sqlx::SqlitePool, config: config::Config) -> axum::Router {
    routes::router(AppState { config, pool })
}
