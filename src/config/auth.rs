use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Lowest bcrypt cost accepted for newly hashed passwords.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session token signing.
    pub session: SessionConfig,

    /// Login flow tuning.
    pub login: LoginConfig,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        self.login.validate()
    }
}

/// Session token configuration.
///
/// Tokens are HS256-signed and expire seven days after issuance. There is no
/// refresh path; clients log in again once a token expires.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Symmetric signing secret. Usually supplied as `"${SESSION_SECRET}"`.
    pub secret: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Validation(
                "auth.session.secret is required to sign session tokens".into(),
            ));
        }
        if self.secret.len() < 32 {
            tracing::warn!(
                length = self.secret.len(),
                "auth.session.secret is shorter than 32 bytes; use a longer random secret in production"
            );
        }
        Ok(())
    }
}

/// Login flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginConfig {
    /// Upper bound for a single identity store lookup, in milliseconds.
    /// A lookup that exceeds it fails the login with a backend error.
    pub lookup_timeout_ms: u64,

    /// Maximum number of password verifications running at once on the
    /// blocking thread pool.
    pub max_concurrent_verifications: usize,

    /// bcrypt cost used by `schoolgate hash-password`.
    pub bcrypt_cost: u32,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 5000,
            max_concurrent_verifications: 4,
            bcrypt_cost: 12,
        }
    }
}

impl LoginConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "auth.login.lookup_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.max_concurrent_verifications == 0 {
            return Err(ConfigError::Validation(
                "auth.login.max_concurrent_verifications must be greater than zero".into(),
            ));
        }
        if !(MIN_BCRYPT_COST..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Validation(format!(
                "auth.login.bcrypt_cost must be between {MIN_BCRYPT_COST} and 31"
            )));
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lookup_timeout_ms)
    }
}
