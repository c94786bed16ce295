//! User data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised while parsing user identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Stable user identifier stored as a UUID.
///
/// # Examples
/// ```
/// use backend::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// assert!(UserId::new(" 3fa85f64-5717-4562-b3fc-2c963f66afa6").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Registered account.
///
/// ## Invariants
/// - `username` and `email` are unique across users (enforced by storage).
/// - `password_hash` is a PHC string; the plaintext is never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user; both timestamps are set to `now`.
    pub fn register(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a stored user.
    pub fn from_parts(
        id: UserId,
        username: String,
        email: String,
        password_hash: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            created_at,
            updated_at,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique login name.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Unique email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Stored password hash in PHC format.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Registration time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last profile or credential change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Public projection of this user as seen by `viewer`.
    ///
    /// The email address is only disclosed to the account owner; everybody
    /// else, including anonymous viewers, receives an empty string.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{User, UserId};
    /// use chrono::Utc;
    ///
    /// let owner = UserId::random();
    /// let user = User::register(owner, "bob", "bob@example.com", "$argon2id$...", Utc::now());
    /// assert_eq!(user.view_for(Some(&owner)).email, "bob@example.com");
    /// assert_eq!(user.view_for(Some(&UserId::random())).email, "");
    /// assert_eq!(user.view_for(None).email, "");
    /// ```
    pub fn view_for(&self, viewer: Option<&UserId>) -> UserView {
        let email = if viewer == Some(&self.id) {
            self.email.clone()
        } else {
            String::new()
        };
        UserView {
            id: self.id,
            username: self.username.clone(),
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serialisable user projection with viewer-dependent email visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Unique login name.
    #[schema(example = "bob")]
    pub username: String,
    /// Email address, empty unless the viewer owns the account.
    #[schema(example = "bob@example.com")]
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last profile or credential change.
    pub updated_at: DateTime<Utc>,
}
