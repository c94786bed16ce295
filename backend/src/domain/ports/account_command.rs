//! Driving port for account mutations.
//!
//! Inbound adapters call [`AccountCommand`] with raw client input; the
//! implementation validates it, talks to the driven ports, and reports
//! user-correctable problems as [`AccountOutcome::Rejected`]. Binding the
//! session to the returned user stays with the adapter.

use async_trait::async_trait;

use crate::domain::{AccountOutcome, Error};

/// Raw registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Email address, must contain `@`.
    pub email: String,
    /// Username, longer than two characters and without `@`.
    pub username: String,
    /// Plaintext password, longer than three characters.
    pub password: String,
}

/// Raw login input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Username, or email address when it contains `@`.
    pub username_or_email: String,
    /// Plaintext password.
    pub password: String,
}

/// Raw password reset input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    /// Token from the reset link.
    pub token: String,
    /// Replacement password.
    pub new_password: String,
}

/// Account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account.
    async fn register(&self, request: RegisterRequest) -> Result<AccountOutcome, Error>;

    /// Check credentials.
    async fn login(&self, request: LoginRequest) -> Result<AccountOutcome, Error>;

    /// Issue a reset token and notify the account owner.
    ///
    /// Always reports success so callers cannot probe for registered emails.
    async fn forgot_password(&self, email: &str) -> Result<bool, Error>;

    /// Redeem a reset token.
    async fn change_password(&self, request: ChangePasswordRequest)
    -> Result<AccountOutcome, Error>;
}
