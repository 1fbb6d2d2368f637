//! HTTP routes
//!
//! Public surface: health, register, login. Everything else sits behind
//! the authentication guard, which rejects with 401 before any handler
//! runs.

pub mod records;
pub mod users;

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

use crate::{auth::require_auth, state::AppState};

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    let protected = Router::new()
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/me/token", delete(users::logout))
        .route("/records", post(records::create).get(records::list))
        .route(
            "/records/{id}",
            get(records::get_by_id)
                .patch(records::update)
                .delete(records::remove),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .merge(protected)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
