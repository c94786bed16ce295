//! Driving port for account reads.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Account lookups for the signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// The account behind a session, `None` when it no longer exists.
    async fn me(&self, user_id: &UserId) -> Result<Option<User>, Error>;
}
