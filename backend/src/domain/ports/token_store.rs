//! Port for short-lived key/value tokens with expiry.
use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token store adapters.
    pub enum TokenStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "token store connection failed: {message}",
        /// Command failed during execution.
        Query { message: String } => "token store command failed: {message}",
    }
}

/// Expiring key/value storage, used for password reset tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value, for `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), TokenStoreError>;

    /// Read and delete the value under `key` in one step; expired or
    /// missing keys read as `None`.
    ///
    /// Concurrent callers racing on one key see the value at most once.
    async fn take(&self, key: &str) -> Result<Option<String>, TokenStoreError>;
}
