//! Account domain service.
//!
//! Implements [`AccountCommand`] and [`AccountQuery`] over the user
//! repository, the password hasher, the token store, and the reset
//! notifier.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccountCommand, AccountQuery, ChangePasswordRequest, LoginRequest, PasswordHashError,
    PasswordHasher, PasswordResetNotifier, RegisterRequest, TokenStore, TokenStoreError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountOutcome, Error, FieldError, LoginCredentials, LoginIdentifier, NewPassword,
    RESET_TOKEN_TTL, RegistrationDetails, ResetToken, User, UserId,
};

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U, T, H, N> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    reset_link_base: String,
}

impl<U, T, H, N> AccountService<U, T, H, N> {
    /// Create a new service.
    ///
    /// `reset_link_base` is the origin of the web client; reset links point
    /// at `<reset_link_base>/change-password/<token>`.
    pub fn new(
        users: Arc<U>,
        tokens: Arc<T>,
        hasher: Arc<H>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        reset_link_base: impl Into<String>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            notifier,
            clock,
            reset_link_base: reset_link_base.into(),
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("{field} already taken"))
        }
    }
}

fn map_token_error(error: TokenStoreError) -> Error {
    match error {
        TokenStoreError::Connection { message } => {
            Error::service_unavailable(format!("token store unavailable: {message}"))
        }
        TokenStoreError::Query { message } => {
            Error::internal(format!("token store error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn token_expired() -> AccountOutcome {
    AccountOutcome::Rejected(FieldError::new(ResetToken::FIELD, "token expired"))
}

fn user_gone() -> AccountOutcome {
    AccountOutcome::Rejected(FieldError::new(ResetToken::FIELD, "user no longer exists"))
}

impl<U, T, H, N> AccountService<U, T, H, N>
where
    U: UserRepository,
    T: TokenStore,
    H: PasswordHasher,
    N: PasswordResetNotifier,
{
    async fn find_for_login(&self, identifier: &LoginIdentifier) -> Result<Option<User>, Error> {
        let found = match identifier {
            LoginIdentifier::Username(username) => self.users.find_by_username(username).await,
            LoginIdentifier::Email(email) => self.users.find_by_email(email).await,
        };
        found.map_err(map_user_error)
    }
}

#[async_trait]
impl<U, T, H, N> AccountCommand for AccountService<U, T, H, N>
where
    U: UserRepository,
    T: TokenStore,
    H: PasswordHasher,
    N: PasswordResetNotifier,
{
    async fn register(&self, request: RegisterRequest) -> Result<AccountOutcome, Error> {
        let details = match RegistrationDetails::validate(
            &request.email,
            &request.username,
            &request.password,
        ) {
            Ok(details) => details,
            Err(rejection) => return Ok(AccountOutcome::Rejected(rejection)),
        };

        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hash_error)?;
        let user = User::register(
            UserId::random(),
            details.username(),
            details.email(),
            password_hash,
            self.clock.utc(),
        );

        match self.users.insert(&user).await {
            Ok(()) => {
                info!(user_id = %user.id(), "registered user");
                Ok(AccountOutcome::Authenticated(user))
            }
            Err(UserPersistenceError::Duplicate { field }) => {
                debug!(%field, "registration collided with existing user");
                Ok(AccountOutcome::Rejected(FieldError::new(
                    field.as_str(),
                    format!("{field} already taken"),
                )))
            }
            Err(other) => Err(map_user_error(other)),
        }
    }

    async fn login(&self, request: LoginRequest) -> Result<AccountOutcome, Error> {
        let credentials = LoginCredentials::new(&request.username_or_email, &request.password);
        let Some(user) = self.find_for_login(credentials.identifier()).await? else {
            return Ok(AccountOutcome::Rejected(LoginCredentials::rejection()));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Ok(AccountOutcome::Rejected(LoginCredentials::rejection()));
        }

        info!(user_id = %user.id(), "user logged in");
        Ok(AccountOutcome::Authenticated(user))
    }

    async fn forgot_password(&self, email: &str) -> Result<bool, Error> {
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        else {
            debug!("password reset requested for unknown email");
            return Ok(true);
        };

        let token = ResetToken::generate();
        self.tokens
            .put(&token.store_key(), &user.id().to_string(), RESET_TOKEN_TTL)
            .await
            .map_err(map_token_error)?;

        let link = token.reset_link(&self.reset_link_base);
        if let Err(error) = self.notifier.send_reset_link(user.email(), &link).await {
            warn!(user_id = %user.id(), %error, "failed to deliver password reset link");
        }
        Ok(true)
    }

    async fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> Result<AccountOutcome, Error> {
        let new_password = match NewPassword::validate(&request.new_password) {
            Ok(password) => password,
            Err(rejection) => return Ok(AccountOutcome::Rejected(rejection)),
        };

        let Ok(token) = request.token.parse::<ResetToken>() else {
            return Ok(token_expired());
        };
        let key = token.store_key();
        let Some(stored) = self.tokens.take(&key).await.map_err(map_token_error)? else {
            return Ok(token_expired());
        };
        let user_id = UserId::new(&stored)
            .map_err(|err| Error::internal(format!("corrupt reset token entry: {err}")))?;

        let Some(user) = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
        else {
            return Ok(user_gone());
        };

        let password_hash = self
            .hasher
            .hash(new_password.as_str())
            .await
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let updated = self
            .users
            .update_password(&user_id, &password_hash, now)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Ok(user_gone());
        }

        info!(user_id = %user_id, "password changed via reset token");

        Ok(AccountOutcome::Authenticated(User::from_parts(
            user.id(),
            user.username().to_owned(),
            user.email().to_owned(),
            password_hash,
            user.created_at(),
            now,
        )))
    }
}

#[async_trait]
impl<U, T, H, N> AccountQuery for AccountService<U, T, H, N>
where
    U: UserRepository,
    T: TokenStore,
    H: PasswordHasher,
    N: PasswordResetNotifier,
{
    async fn me(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(user_id).await.map_err(map_user_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
