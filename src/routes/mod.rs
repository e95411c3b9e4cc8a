pub mod auth;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Routes mounted under `/api`.
pub fn get_api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/session", get(auth::session))
}
