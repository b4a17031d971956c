pub mod auth;
pub mod error;
pub mod export;
pub mod messages;
pub mod middleware;
pub mod users;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use serde_json::{Value, json};

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

/// All HTTP routes. Mutating message and user routes sit behind `require_auth`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/users", get(users::list_users))
        .route("/users/export-data", get(export::export_users))
        .route("/user/{id}", get(users::get_user))
        .route("/messages", get(messages::list_messages))
        .route("/message/{id}", get(messages::get_message))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/user/{id}", put(users::update_user).delete(users::delete_user))
        .route("/messages", post(messages::create_message))
        .route(
            "/message/{id}",
            put(messages::update_message).delete(messages::delete_message),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
