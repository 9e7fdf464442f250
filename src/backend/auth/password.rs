/**
 * Password Hashing
 *
 * Thin wrapper around bcrypt with a configurable cost. Each hash carries its
 * own random salt.
 *
 * `verify_dummy` runs a full bcrypt verification against a throwaway hash so
 * a login for an unknown username costs the same as one with a wrong
 * password.
 *
 * Request handlers use the `*_blocking` variants, which run bcrypt on
 * tokio's blocking pool instead of an async worker.
 */

use bcrypt::BcryptError;
use std::sync::{Arc, OnceLock};

use crate::backend::error::{BackendError, BackendResult};

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy: Arc::new(OnceLock::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        bcrypt::hash(password, self.cost)
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, BcryptError> {
        bcrypt::verify(password, hash)
    }

    /// Spend the same work as `verify` without a stored hash. Always false.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let dummy = self.dummy.get_or_init(|| {
            bcrypt::hash("gogo-timing-equalizer", self.cost).unwrap_or_default()
        });
        if let Err(e) = bcrypt::verify(password, dummy) {
            tracing::debug!("Dummy password verification failed: {:?}", e);
        }
        false
    }
}

impl PasswordHasher {
    pub async fn hash_blocking(&self, password: &str) -> BackendResult<String> {
        let hasher = self.clone();
        let password = password.to_owned();
        Ok(off_worker(move || hasher.hash(&password)).await??)
    }

    pub async fn verify_blocking(&self, password: &str, hash: &str) -> BackendResult<bool> {
        let hasher = self.clone();
        let (password, hash) = (password.to_owned(), hash.to_owned());
        Ok(off_worker(move || hasher.verify(&password, &hash)).await??)
    }

    pub async fn verify_dummy_blocking(&self, password: &str) -> BackendResult<bool> {
        let hasher = self.clone();
        let password = password.to_owned();
        off_worker(move || hasher.verify_dummy(&password)).await
    }
}

async fn off_worker<T, F>(work: F) -> BackendResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| BackendError::internal(format!("password task failed: {}", e)))
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
