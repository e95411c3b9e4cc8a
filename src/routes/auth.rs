//! Login and session routes.
//!
//! - `POST /api/auth/login` - Exchanges a login id and password for a session token
//! - `GET /api/auth/session` - Reports the claims of a bearer token

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde::Serialize;

use crate::{
    AppState,
    auth::{LoginError, SessionClaims, SessionError, UserProjection},
    models::LoginRequest,
};

const LOGIN_SUCCESS_MESSAGE: &str = "Login Successful";

/// Successful login body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub role: String,
    pub user: UserProjection,
}

/// Exchange a login id and password for a session token.
///
/// A body that is not valid JSON is treated like one with missing fields;
/// one cut off by the body limit is a 413.
#[tracing::instrument(name = "auth.login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, LoginError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable login body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            LoginError::PayloadTooLarge
        } else {
            LoginError::Validation
        }
    })?;
    let credentials = request
        .into_credentials()
        .map_err(|_| LoginError::Validation)?;

    let outcome = state.login.login(&credentials).await?;

    Ok(Json(LoginResponse {
        message: LOGIN_SUCCESS_MESSAGE,
        token: outcome.token,
        role: outcome.role,
        user: outcome.user,
    }))
}

/// Verify the bearer token on the request and return its claims.
#[tracing::instrument(name = "auth.session", skip_all)]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionClaims>, SessionError> {
    let token = bearer_token(&headers).ok_or(SessionError::Missing)?;
    let claims = state.login.sessions().verify(token)?;
    Ok(Json(claims))
}

/// Extract the token from `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
