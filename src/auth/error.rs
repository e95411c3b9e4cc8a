use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body of every login and session error response.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Terminal failures of a login attempt.
///
/// `Backend` carries detail for the server log only; it is never rendered
/// into the response.
#[derive(Debug)]
pub enum LoginError {
    /// Missing or empty login id or secret.
    Validation,

    /// Request body over `server.body_limit_bytes`.
    PayloadTooLarge,

    /// No identity store holds the login id.
    NotFound,

    /// Found, but the secret does not verify.
    InvalidCredentials,

    /// A store lookup failed or timed out, or verification could not run.
    Backend(String),
}

impl LoginError {
    pub fn status(&self) -> StatusCode {
        match self {
            LoginError::Validation => StatusCode::BAD_REQUEST,
            LoginError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LoginError::NotFound => StatusCode::NOT_FOUND,
            LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LoginError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message.
    pub fn public_message(&self) -> &'static str {
        match self {
            LoginError::Validation => "User ID & Password required",
            LoginError::PayloadTooLarge => "Request body too large",
            LoginError::NotFound => "User not found",
            LoginError::InvalidCredentials => "Invalid credentials",
            LoginError::Backend(_) => "Internal server error",
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        if let LoginError::Backend(detail) = &self {
            tracing::error!(error = %detail, "Login failed on a backend error");
        }
        (self.status(), Json(MessageBody::new(self.public_message()))).into_response()
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::Backend(detail) => write!(f, "Backend error: {}", detail),
            other => f.write_str(other.public_message()),
        }
    }
}

impl std::error::Error for LoginError {}

/// Failures issuing or verifying a session token.
#[derive(Debug)]
pub enum SessionError {
    /// No bearer token on the request.
    Missing,

    /// Bad signature, wrong algorithm, malformed token.
    Invalid,

    /// Signature verified but the token is past its expiry.
    Expired,

    /// Token could not be signed.
    Signing(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match &self {
            SessionError::Missing | SessionError::Invalid | SessionError::Expired => {
                StatusCode::UNAUTHORIZED
            }
            SessionError::Signing(detail) => {
                tracing::error!(error = %detail, "Failed to sign session token");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            SessionError::Signing(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(MessageBody::new(message))).into_response()
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Missing => write!(f, "Authentication token required"),
            SessionError::Invalid => write!(f, "Invalid authentication token"),
            SessionError::Expired => write!(f, "Authentication token has expired"),
            SessionError::Signing(msg) => write!(f, "Failed to sign token: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<SessionError> for LoginError {
    fn from(err: SessionError) -> Self {
        LoginError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use rstest::rstest;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(LoginError::Validation, 400, "User ID & Password required")]
    #[case(LoginError::PayloadTooLarge, 413, "Request body too large")]
    #[case(LoginError::NotFound, 404, "User not found")]
    #[case(LoginError::InvalidCredentials, 401, "Invalid credentials")]
    #[case(LoginError::Backend("pool timed out".into()), 500, "Internal server error")]
    #[tokio::test]
    async fn test_login_error_responses(
        #[case] error: LoginError,
        #[case] status: u16,
        #[case] message: &str,
    ) {
        let response = error.into_response();
        assert_eq!(response.status().as_u16(), status);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "message": message }));
    }

    #[tokio::test]
    async fn test_backend_detail_is_not_leaked() {
        let response = LoginError::Backend("connection refused at 10.0.0.5".into()).into_response();
        let body = body_json(response).await;
        assert!(!body.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn test_expired_session_is_401() {
        let response = SessionError::Expired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_signing_failure_is_500() {
        let response = SessionError::Signing("bad key".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
