//! bcrypt verification off the async runtime.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::LoginError;

/// Verifies secrets against stored bcrypt hashes.
///
/// Each verification runs on the blocking pool. A semaphore bounds how many
/// run at once so a burst of logins cannot starve other blocking work. The
/// permit travels into the blocking job, so a cancelled caller keeps its
/// slot until bcrypt actually finishes.
#[derive(Clone)]
pub struct CredentialVerifier {
    permits: Arc<Semaphore>,
    cost: u32,
}

impl CredentialVerifier {
    /// `cost` is used only for [`hash`](Self::hash); verification reads the
    /// cost embedded in each stored hash.
    pub fn new(max_concurrent: usize, cost: u32) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            cost,
        }
    }

    /// Check `secret` against `stored_hash`.
    ///
    /// A missing or unparseable hash never verifies: it yields `Ok(false)`.
    /// `Err` means verification could not run at all.
    pub async fn verify(&self, secret: &str, stored_hash: Option<&str>) -> Result<bool, LoginError> {
        let Some(stored_hash) = stored_hash.filter(|h| !h.is_empty()) else {
            tracing::debug!("No stored credential hash; rejecting");
            return Ok(false);
        };

        let permit = self.acquire().await?;
        let secret = secret.to_owned();
        let stored_hash = stored_hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            bcrypt::verify(secret, &stored_hash)
        })
        .await
        .map_err(|e| LoginError::Backend(format!("verification task failed: {}", e)))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential hash is malformed; rejecting");
                Ok(false)
            }
        }
    }

    /// Hash `secret` at the configured cost.
    pub async fn hash(&self, secret: &str) -> Result<String, LoginError> {
        let permit = self.acquire().await?;
        let secret = secret.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            bcrypt::hash(secret, cost)
        })
        .await
        .map_err(|e| LoginError::Backend(format!("hashing task failed: {}", e)))?
        .map_err(|e| LoginError::Backend(format!("hashing failed: {}", e)))
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, LoginError> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| LoginError::Backend(format!("verification pool closed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(2, 4)
    }

    #[tokio::test]
    async fn test_matching_secret_verifies() {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        assert!(verifier().verify("correct horse", Some(&hash)).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        assert!(!verifier().verify("battery staple", Some(&hash)).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_hash_fails_closed() {
        assert!(!verifier().verify("anything", None).await.unwrap());
        assert!(!verifier().verify("anything", Some("")).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_fails_closed() {
        assert!(!verifier().verify("anything", Some("plaintext")).await.unwrap());
        assert!(!verifier().verify("$2b$12$tooshort", Some("$2b$12$tooshort")).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_round_trips_through_verify() {
        let v = verifier();
        let hash = v.hash("s3cret").await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(v.verify("s3cret", Some(&hash)).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_verifications_share_bounded_pool() {
        let v = CredentialVerifier::new(1, 4);
        let hash = bcrypt::hash("pw", 4).unwrap();
        let (a, b) = tokio::join!(v.verify("pw", Some(&hash)), v.verify("nope", Some(&hash)));
        assert!(a.unwrap());
        assert!(!b.unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_verification_holds_permit_until_bcrypt_finishes() {
        let v = CredentialVerifier::new(1, 4);
        let hash = bcrypt::hash("pw", 13).unwrap();

        let task = {
            let v = v.clone();
            tokio::spawn(async move { v.verify("pw", Some(&hash)).await })
        };
        while v.permits.available_permits() > 0 {
            tokio::task::yield_now().await;
        }
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        // The blocking job is still running and owns the only slot.
        assert_eq!(v.permits.available_permits(), 0);

        tokio::time::timeout(std::time::Duration::from_secs(30), async {
            while v.permits.available_permits() == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("permit is released once bcrypt returns");
    }
}
