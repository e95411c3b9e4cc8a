//! Signed session tokens handed out on a successful login.
//!
//! Tokens are compact HS256 JWTs. The application claims are exactly the
//! subject id and role; `iat`, `exp` and a random `jti` ride along as
//! registered claims so every issued token is distinct.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionError;

/// Lifetime of an issued token.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Wire form of the token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Verified session, as reported by `GET /api/auth/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub id: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<TokenClaims> for SessionClaims {
    type Error = SessionError;

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        let issued_at = Utc
            .timestamp_opt(claims.iat, 0)
            .single()
            .ok_or(SessionError::Invalid)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(SessionError::Invalid)?;
        Ok(Self {
            id: claims.id,
            role: claims.role,
            issued_at,
            expires_at,
        })
    }
}

/// Issues and verifies session tokens with one process-wide HMAC secret.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionIssuer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `subject_id` valid for [`SESSION_TTL_SECS`] from now.
    pub fn issue(&self, subject_id: &str, role: &str) -> Result<String, SessionError> {
        self.issue_at(subject_id, role, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let iat = issued_at.timestamp();
        let claims = TokenClaims {
            id: subject_id.to_string(),
            role: role.to_string(),
            iat,
            exp: iat + SESSION_TTL_SECS,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verify signature, algorithm and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => {
                    tracing::debug!(error = %e, "Rejected session token");
                    SessionError::Invalid
                }
            },
        )?;
        SessionClaims::try_from(data.claims)
    }
}

impl fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("algorithm", &"HS256")
            .field("ttl_secs", &SESSION_TTL_SECS)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use chrono::Duration;

    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(SECRET)
    }

    fn payload(token: &str) -> serde_json::Value {
        let segment = token.split('.').nth(1).expect("token has a payload");
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(segment)
            .expect("payload is base64url");
        serde_json::from_slice(&bytes).expect("payload is json")
    }

    #[test]
    fn test_issued_token_verifies() {
        let token = issuer().issue("rec-1", "teacher").unwrap();
        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.id, "rec-1");
        assert_eq!(claims.role, "teacher");
        assert_eq!(
            (claims.expires_at - claims.issued_at).num_seconds(),
            SESSION_TTL_SECS
        );
    }

    #[test]
    fn test_payload_carries_only_subject_and_role_besides_registered_claims() {
        let token = issuer().issue("rec-1", "student").unwrap();
        let payload = payload(&token);
        let mut keys: Vec<&str> = payload
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["exp", "iat", "id", "jti", "role"]);
        assert_eq!(payload["id"], "rec-1");
        assert_eq!(payload["role"], "student");
    }

    #[test]
    fn test_two_tokens_for_same_subject_differ() {
        let a = issuer().issue("rec-1", "teacher").unwrap();
        let b = issuer().issue("rec-1", "teacher").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_valid_one_second_before_expiry() {
        let issued_at = Utc::now() - Duration::seconds(SESSION_TTL_SECS) + Duration::seconds(1);
        let token = issuer().issue_at("rec-1", "teacher", issued_at).unwrap();
        assert!(issuer().verify(&token).is_ok());
    }

    #[test]
    fn test_token_expired_one_second_after_expiry() {
        let issued_at = Utc::now() - Duration::seconds(SESSION_TTL_SECS) - Duration::seconds(1);
        let token = issuer().issue_at("rec-1", "teacher", issued_at).unwrap();
        assert!(matches!(issuer().verify(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = SessionIssuer::new(b"another-secret-another-secret-xx")
            .issue("rec-1", "teacher")
            .unwrap();
        assert!(matches!(issuer().verify(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = TokenClaims {
            id: "rec-1".into(),
            role: "teacher".into(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
            jti: "j".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(issuer().verify(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(issuer().verify("not.a.jwt"), Err(SessionError::Invalid)));
        assert!(matches!(issuer().verify(""), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_debug_does_not_print_keys() {
        let rendered = format!("{:?}", issuer());
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
