//! Argon2id password hashing adapter.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) with a per-password random
//! salt, so they can be verified without storing parameters separately.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// [`PasswordHasher`] backed by Argon2id with the crate's default parameters.
///
/// Key derivation runs on Tokio's blocking pool so a slow hash never stalls
/// the worker serving other requests.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_blocking(&self, password: &[u8]) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password, &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    fn verify_blocking(
        &self,
        password: &[u8],
        password_hash: &str,
    ) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|err| PasswordHashError::hashing(format!("stored hash unreadable: {err}")))?;
        match self.argon2.verify_password(password, &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hashing(err.to_string())),
        }
    }
}

async fn off_executor<T, F>(work: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::hashing(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let hasher = self.clone();
        let password = Zeroizing::new(password.as_bytes().to_vec());
        off_executor(move || hasher.hash_blocking(&password)).await
    }

    async fn verify(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordHashError> {
        let hasher = self.clone();
        let password = Zeroizing::new(password.as_bytes().to_vec());
        let password_hash = password_hash.to_owned();
        off_executor(move || hasher.verify_blocking(&password, &password_hash)).await
    }
}
