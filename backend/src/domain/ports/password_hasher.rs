//! Port for one-way password hashing.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing or parsing a stored hash failed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Derives and checks password hashes.
///
/// Hashes are self-describing strings (PHC format) that embed their salt
/// and parameters. Key derivation is CPU-bound, so adapters must not run it
/// on the async executor threads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh random salt.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    ///
    /// A mismatch is `Ok(false)`; errors are reserved for malformed hashes.
    async fn verify(&self, password: &str, password_hash: &str)
    -> Result<bool, PasswordHashError>;
}
