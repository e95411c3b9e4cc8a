//! JSON body for requests refused by the body size limit.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::LoginError;

/// Replace the plain-text 413 produced by `RequestBodyLimitLayer` with the
/// `{message}` body every other auth error uses.
pub async fn payload_too_large_as_json(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        LoginError::PayloadTooLarge.into_response()
    } else {
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::post};
    use tower::ServiceExt;
    use tower_http::limit::RequestBodyLimitLayer;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", post(|body: String| async move { body }))
            .layer(RequestBodyLimitLayer::new(8))
            .layer(axum::middleware::map_response(payload_too_large_as_json))
    }

    #[tokio::test]
    async fn test_limit_rejection_becomes_json() {
        let response = app()
            .oneshot(
                Request::post("/")
                    .header("content-length", "9")
                    .body(Body::from("123456789"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"message": "Request body too large"}));
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = app()
            .oneshot(Request::post("/").body(Body::from("ok")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
