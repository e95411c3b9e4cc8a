use std::fmt;

use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/auth/login`.
///
/// Both fields are optional at the serde level so that a missing field is
/// reported as a validation failure rather than a deserialization error.
#[derive(Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(rename = "userId", default)]
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,

    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Validate the request and turn it into credentials.
    pub fn into_credentials(self) -> Result<Credentials, validator::ValidationErrors> {
        self.validate()?;
        match (self.user_id, self.password) {
            (Some(login_id), Some(secret)) => Ok(Credentials { login_id, secret }),
            // `required` above already rejected these.
            _ => Err(validator::ValidationErrors::new()),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_id", &self.user_id)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// A validated login id and secret, both non-empty.
#[derive(Clone)]
pub struct Credentials {
    pub login_id: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(login_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login_id", &self.login_id)
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn parse(body: &str) -> LoginRequest {
        serde_json::from_str(body).expect("body should deserialize")
    }

    #[rstest]
    #[case(r#"{}"#)]
    #[case(r#"{"userId": "T-1"}"#)]
    #[case(r#"{"password": "pw"}"#)]
    #[case(r#"{"userId": "", "password": "pw"}"#)]
    #[case(r#"{"userId": "T-1", "password": ""}"#)]
    #[case(r#"{"userId": null, "password": "pw"}"#)]
    fn test_incomplete_requests_are_rejected(#[case] body: &str) {
        assert!(parse(body).into_credentials().is_err());
    }

    #[test]
    fn test_complete_request_yields_credentials() {
        let credentials = parse(r#"{"userId": "ADM-7", "password": "s3cret"}"#)
            .into_credentials()
            .unwrap();
        assert_eq!(credentials.login_id, "ADM-7");
        assert_eq!(credentials.secret, "s3cret");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("ADM-7", "s3cret");
        assert!(!format!("{credentials:?}").contains("s3cret"));

        let request = parse(r#"{"userId": "ADM-7", "password": "s3cret"}"#);
        assert!(!format!("{request:?}").contains("s3cret"));
    }
}
