use std::sync::Arc;

use crate::{
    auth::{
        CredentialVerifier, LoginError, Resolver, SessionIssuer, StoreKind, UserProjection,
    },
    config::LoginConfig,
    db::IdentityStoreRepo,
    models::Credentials,
};

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub role: String,
    pub store: StoreKind,
    pub user: UserProjection,
}

/// Service layer for the login flow: resolve, verify, issue, project.
#[derive(Clone)]
pub struct LoginService {
    resolver: Resolver,
    verifier: CredentialVerifier,
    sessions: SessionIssuer,
}

impl LoginService {
    pub fn new(
        repo: Arc<dyn IdentityStoreRepo>,
        config: &LoginConfig,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            resolver: Resolver::new(repo, config.lookup_timeout()),
            verifier: CredentialVerifier::new(
                config.max_concurrent_verifications,
                config.bcrypt_cost,
            ),
            sessions,
        }
    }

    /// Run one login attempt.
    ///
    /// The store that resolves the id is final: a wrong secret there is
    /// `InvalidCredentials` even if a later store holds the same id.
    #[tracing::instrument(skip_all, fields(login_id = %credentials.login_id))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, LoginError> {
        if credentials.login_id.is_empty() || credentials.secret.is_empty() {
            return Err(LoginError::Validation);
        }

        let record = match self.resolver.resolve(&credentials.login_id).await {
            Ok(record) => record,
            Err(LoginError::NotFound) => {
                tracing::info!("Login rejected: unknown login id");
                return Err(LoginError::NotFound);
            }
            Err(e) => return Err(e),
        };

        let verified = self
            .verifier
            .verify(&credentials.secret, record.credential_hash())
            .await?;
        if !verified {
            tracing::info!(store = %record.store, "Login rejected: credential mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        let token = self.sessions.issue(&record.subject_id, &record.role)?;
        let user = UserProjection::from_record(&record);
        tracing::info!(store = %record.store, role = %record.role, "Login succeeded");

        Ok(LoginOutcome {
            token,
            role: record.role,
            store: record.store,
            user,
        })
    }

    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }
}
