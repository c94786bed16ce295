//! Port abstraction for user persistence adapters and their errors.
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{User, UserId};

use super::define_port_error;

/// User column protected by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueUserField {
    /// `users.username`
    Username,
    /// `users.email`
    Email,
}

impl UniqueUserField {
    /// Client-facing field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for UniqueUserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Insert collided with an existing username or email.
        Duplicate { field: UniqueUserField } => "user {field} already exists",
    }
}

/// Storage for registered accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// Fails with [`UserPersistenceError::Duplicate`] when the username or
    /// email is already registered.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose id appears in `ids`, in no particular order.
    ///
    /// Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Replace a user's password hash; returns `false` when the user is gone.
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError>;
}
