//! Probes for the orchestrator and for whoever is paged when logins fail.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// `"healthy"` or `"unhealthy"`.
    pub status: &'static str,
    pub version: &'static str,
    pub database: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl ComponentStatus {
    fn status_code(&self) -> StatusCode {
        if self.healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Time one round-trip to the identity store database. The error detail
/// goes to the log, not the health body.
async fn check_database(state: &AppState) -> ComponentStatus {
    let started = Instant::now();
    let outcome = state.db.health_check().await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Err(e) = &outcome {
        tracing::warn!(error = %e, latency_ms, "Identity store database is unreachable");
    }
    ComponentStatus {
        healthy: outcome.is_ok(),
        message: outcome
            .is_err()
            .then(|| "identity store database unreachable".to_string()),
        latency_ms,
    }
}

#[tracing::instrument(name = "health.check", skip_all)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let database = check_database(&state).await;
    let status = database.status_code();
    let body = HealthStatus {
        status: if database.healthy { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    };
    (status, Json(body))
}

/// Succeeds whenever the process is serving.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Fails while logins cannot reach the stores.
#[tracing::instrument(name = "health.readiness", skip_all)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    check_database(&state).await.status_code()
}
