use std::{net::IpAddr, time::Duration};

use http::{
    HeaderName, HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::ConfigError;

/// `[server]`: listener and request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,

    /// Larger login bodies are refused with 413 before they are parsed.
    pub body_limit_bytes: usize,

    /// The dashboards are served from their own origin, so this usually
    /// needs `allowed_origins` set.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            body_limit_bytes: 64 * 1024,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.body_limit_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.body_limit_bytes must be greater than zero".into(),
            ));
        }
        self.cors.validate()
    }
}

/// Cross-origin access for the dashboard frontends.
///
/// Only the origins are configurable. Methods and headers are fixed to what
/// `POST /api/auth/login` and `GET /api/auth/session` need.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub enabled: bool,

    /// Dashboard origins, e.g. `https://admin.school.example`. `["*"]`
    /// allows any origin; empty refuses every cross-origin request.
    pub allowed_origins: Vec<String>,

    /// Let browsers attach credentials. Not allowed together with `["*"]`.
    pub allow_credentials: bool,

    /// How long a browser may cache the preflight answer.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age_secs: 600,
        }
    }
}

impl CorsConfig {
    fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.allow_credentials && self.allows_any_origin() {
            return Err(ConfigError::Validation(
                "server.cors: allow_credentials cannot be used with allowed_origins = [\"*\"]"
                    .into(),
            ));
        }
        Ok(())
    }

    /// The CORS layer for the auth routes, or `None` when disabled.
    pub fn into_layer(self) -> Option<CorsLayer> {
        if !self.enabled {
            return None;
        }

        let origins = if self.allows_any_origin() {
            tracing::warn!("CORS accepts logins from any origin");
            AllowOrigin::any()
        } else {
            let parsed: Vec<HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "Skipping unparseable CORS origin");
                        None
                    }
                })
                .collect();
            if parsed.is_empty() {
                tracing::info!("No usable CORS origins; cross-origin logins are refused");
            }
            AllowOrigin::list(parsed)
        };

        let request_id = HeaderName::from_static("x-request-id");
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION, request_id.clone()])
                .expose_headers([request_id])
                .allow_credentials(self.allow_credentials)
                .max_age(Duration::from_secs(self.max_age_secs)),
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use tower::ServiceExt;

    use super::*;

    const DASHBOARD: &str = "https://admin.school.test";

    async fn preflight(cors: CorsConfig, origin: &str) -> axum::response::Response {
        let layer = cors.into_layer().unwrap();
        let app = Router::new()
            .route("/api/auth/login", post(|| async { "ok" }))
            .layer(layer);
        app.oneshot(
            Request::options("/api/auth/login")
                .header("origin", origin)
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_disabled_cors_has_no_layer() {
        let cors = CorsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(cors.into_layer().is_none());
    }

    #[tokio::test]
    async fn test_preflight_from_dashboard_allows_login() {
        let cors = CorsConfig {
            allowed_origins: vec![DASHBOARD.into(), "bad\norigin".into()],
            ..Default::default()
        };
        let response = preflight(cors, DASHBOARD).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], DASHBOARD);
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"), "{methods}");
        assert!(!methods.contains("DELETE"), "{methods}");
    }

    #[tokio::test]
    async fn test_preflight_from_unknown_origin_gets_no_allow_origin() {
        let cors = CorsConfig {
            allowed_origins: vec![DASHBOARD.into()],
            ..Default::default()
        };
        let response = preflight(cors, "https://evil.test").await;
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_wildcard_with_credentials_rejected() {
        let cors = CorsConfig {
            allowed_origins: vec!["*".into()],
            allow_credentials: true,
            ..Default::default()
        };
        assert!(matches!(cors.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_wildcard_without_credentials_accepted() {
        let cors = CorsConfig {
            allowed_origins: vec!["*".into()],
            ..Default::default()
        };
        assert!(cors.validate().is_ok());
        assert!(cors.into_layer().is_some());
    }
}
