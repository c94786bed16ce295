//! Redis-backed token store.
//!
//! Password reset tokens live in Redis with a server-side expiry, so an
//! abandoned reset needs no cleanup job. Connections come from a `bb8` pool
//! of multiplexed Redis connections.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{AsyncCommands as _, RedisError};
use tracing::debug;

use crate::domain::ports::{TokenStore, TokenStoreError};

/// [`TokenStore`] adapter storing keys in Redis with `SET ... EX` and
/// redeeming them with `GETDEL`.
#[derive(Clone)]
pub struct RedisTokenStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisTokenStore {
    /// Wrap an existing pool.
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    /// Build a pool of `max_size` connections to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Connection`] when the URL is invalid or the
    /// initial connection fails.
    pub async fn connect(redis_url: &str, max_size: u32) -> Result<Self, TokenStoreError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|err| TokenStoreError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(max_size.max(1))
            .build(manager)
            .await
            .map_err(|err| TokenStoreError::connection(err.to_string()))?;
        Ok(Self::new(pool))
    }
}

fn map_redis_error(error: &RedisError) -> TokenStoreError {
    debug!(%error, "redis command failed");
    if error.is_io_error() || error.is_connection_dropped() || error.is_timeout() {
        TokenStoreError::connection(error.to_string())
    } else {
        TokenStoreError::query(error.to_string())
    }
}

fn map_run_error(error: RunError<RedisError>) -> TokenStoreError {
    match error {
        RunError::User(err) => TokenStoreError::connection(err.to_string()),
        RunError::TimedOut => TokenStoreError::connection("timed out waiting for a connection"),
    }
}

/// Redis expiries are whole seconds and must be positive.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), TokenStoreError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds(ttl))
            .await
            .map_err(|err| map_redis_error(&err))
    }

    async fn take(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        conn.get_del::<_, Option<String>>(key)
            .await
            .map_err(|err| map_redis_error(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb8_redis::redis::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_secs(259_200), 259_200)]
    #[case(Duration::from_millis(1_500), 1)]
    #[case(Duration::ZERO, 1)]
    fn ttl_is_whole_positive_seconds(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(ttl_seconds(ttl), expected);
    }

    #[rstest]
    fn io_failures_are_connection_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = map_redis_error(&RedisError::from(io));
        assert!(matches!(err, TokenStoreError::Connection { .. }));
    }

    #[rstest]
    fn type_errors_are_query_errors() {
        let err = map_redis_error(&RedisError::from((
            ErrorKind::UnexpectedReturnType,
            "wrong type",
        )));
        assert!(matches!(err, TokenStoreError::Query { .. }));
    }

    #[rstest]
    fn pool_timeouts_are_connection_errors() {
        let err = map_run_error(RunError::TimedOut);
        assert!(matches!(err, TokenStoreError::Connection { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_url_is_rejected() {
        let result = RedisTokenStore::connect("not a url", 1).await;
        assert!(matches!(result, Err(TokenStoreError::Connection { .. })));
    }
}
