//! Login gateway for the school administration dashboards.
//!
//! A login id is resolved against five identity stores in a fixed order
//! (teachers, students, then three generations of administrator stores).
//! The first store holding the id owns the attempt: its bcrypt hash is
//! checked, and on success a seven-day HS256 session token is issued along
//! with a redacted view of the record.

pub mod auth;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;

#[cfg(all(test, feature = "database-sqlite"))]
mod tests;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{auth::SessionIssuer, services::LoginService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::GatewayConfig>,
    pub db: Arc<db::DbPool>,
    pub login: LoginService,
}

impl AppState {
    pub fn new(config: Arc<config::GatewayConfig>, db: Arc<db::DbPool>) -> Self {
        let sessions = SessionIssuer::new(config.auth.session.secret.as_bytes());
        let login = LoginService::new(db.identity_stores(), &config.auth.login, sessions);
        Self { config, db, login }
    }
}

/// Assemble the router with every route and the middleware stack, sized
/// from `state.config.server`.
pub fn build_app(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = server.cors.clone().into_layer();
    let body_limit = server.body_limit_bytes;

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness))
        .nest("/api", routes::get_api_routes());

    app = app.layer(axum::middleware::from_fn(middleware::request_id_middleware));

    // Layers are applied in reverse order, so CORS runs before request IDs.
    if let Some(cors_layer) = cors {
        app = app.layer(cors_layer);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::map_response(
            middleware::payload_too_large_as_json,
        ))
        .with_state(state)
}
