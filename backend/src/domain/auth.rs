//! Account primitives: registration rules, login credentials, password reset
//! tokens, and the field-level validation outcome returned to clients.
//!
//! Account operations report user-correctable problems as a [`FieldError`]
//! inside a successful response rather than as an [`Error`](super::Error);
//! clients render the message next to the named form field.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::User;

/// Minimum username length, exclusive.
pub const USERNAME_MIN_EXCLUSIVE: usize = 2;
/// Minimum password length, exclusive.
pub const PASSWORD_MIN_EXCLUSIVE: usize = 3;

/// Token-store key prefix for password reset tokens.
pub const RESET_TOKEN_PREFIX: &str = "forget-password:";
/// How long a password reset token stays redeemable.
pub const RESET_TOKEN_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// A validation message attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending input field, as the client sent it.
    #[schema(example = "username")]
    pub field: String,
    /// Human-readable message.
    #[schema(example = "username already taken")]
    pub message: String,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of an account mutation that may be rejected on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    /// The operation succeeded and the caller should be signed in as `User`.
    Authenticated(User),
    /// The input was rejected.
    Rejected(FieldError),
}

impl AccountOutcome {
    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Rejected(_) => None,
        }
    }
}

fn password_length_error(field: &str, password: &str) -> Option<FieldError> {
    (password.chars().count() <= PASSWORD_MIN_EXCLUSIVE).then(|| {
        FieldError::new(
            field,
            format!("length must be greater than {PASSWORD_MIN_EXCLUSIVE}"),
        )
    })
}

/// Registration input that passed every field rule.
///
/// Rules are checked in a fixed order and only the first failure is
/// reported:
/// 1. the email contains `@`;
/// 2. the username is longer than two characters;
/// 3. the password is longer than three characters;
/// 4. the username does not contain `@`.
///
/// # Examples
/// ```
/// use backend::domain::RegistrationDetails;
///
/// let details = RegistrationDetails::validate("a@b.com", "bob", "secret").expect("valid");
/// assert_eq!(details.username(), "bob");
///
/// let err = RegistrationDetails::validate("nope", "x", "y").expect_err("invalid");
/// assert_eq!(err.field, "email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDetails {
    email: String,
    username: String,
    password: Zeroizing<String>,
}

impl RegistrationDetails {
    /// Apply the registration rules to raw input.
    pub fn validate(email: &str, username: &str, password: &str) -> Result<Self, FieldError> {
        if !email.contains('@') {
            return Err(FieldError::new("email", "invalid email"));
        }
        if username.chars().count() <= USERNAME_MIN_EXCLUSIVE {
            return Err(FieldError::new(
                "username",
                format!("length must be greater than {USERNAME_MIN_EXCLUSIVE}"),
            ));
        }
        if let Some(error) = password_length_error("password", password) {
            return Err(error);
        }
        if username.contains('@') {
            return Err(FieldError::new("username", "cannot include an @"));
        }
        Ok(Self {
            email: email.to_owned(),
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address to register.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Username to register.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plaintext password, wiped on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// How a login attempt identifies the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    /// Look the account up by username.
    Username(String),
    /// Look the account up by email address.
    Email(String),
}

impl LoginIdentifier {
    /// Classify raw input: anything containing `@` is an email address.
    pub fn parse(raw: &str) -> Self {
        if raw.contains('@') {
            Self::Email(raw.to_owned())
        } else {
            Self::Username(raw.to_owned())
        }
    }
}

/// Login credentials.
///
/// # Examples
/// ```
/// use backend::domain::{LoginCredentials, LoginIdentifier};
///
/// let creds = LoginCredentials::new("bob@example.com", "secret");
/// assert_eq!(
///     creds.identifier(),
///     &LoginIdentifier::Email("bob@example.com".to_owned())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: LoginIdentifier,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Field name used when a login attempt is rejected.
    pub const FIELD: &'static str = "usernameOrEmail";

    /// Build credentials from the raw `usernameOrEmail` and password.
    pub fn new(username_or_email: &str, password: &str) -> Self {
        Self {
            identifier: LoginIdentifier::parse(username_or_email),
            password: Zeroizing::new(password.to_owned()),
        }
    }

    /// Account lookup key.
    pub fn identifier(&self) -> &LoginIdentifier {
        &self.identifier
    }

    /// Plaintext password, wiped on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// The single error reported for unknown accounts and wrong passwords.
    pub fn rejection() -> FieldError {
        FieldError::new(Self::FIELD, "invalid username or password")
    }
}

/// Replacement password supplied with a reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Field name used when the new password is rejected.
    pub const FIELD: &'static str = "newPassword";

    /// Enforce the password length rule.
    pub fn validate(password: &str) -> Result<Self, FieldError> {
        match password_length_error(Self::FIELD, password) {
            Some(error) => Err(error),
            None => Ok(Self(Zeroizing::new(password.to_owned()))),
        }
    }

    /// Plaintext password, wiped on drop.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Single-use password reset token.
///
/// # Examples
/// ```
/// use backend::domain::ResetToken;
///
/// let token: ResetToken = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().expect("uuid");
/// assert_eq!(
///     token.store_key(),
///     "forget-password:3fa85f64-5717-4562-b3fc-2c963f66afa6"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetToken(Uuid);

impl ResetToken {
    /// Field name used when a token cannot be redeemed.
    pub const FIELD: &'static str = "token";

    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Key under which the token is kept in the token store.
    pub fn store_key(&self) -> String {
        format!("{RESET_TOKEN_PREFIX}{}", self.0)
    }

    /// Link the user follows to choose a new password.
    pub fn reset_link(&self, base: &str) -> String {
        format!("{}/change-password/{}", base.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for ResetToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bob.example.com", "bob", "secret", "email", "invalid email")]
    #[case("a@b.com", "bo", "secret", "username", "length must be greater than 2")]
    #[case("a@b.com", "bob", "abc", "password", "length must be greater than 3")]
    #[case("a@b.com", "bob@home", "secret", "username", "cannot include an @")]
    fn each_rule_rejects_independently(
        #[case] email: &str,
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let error = RegistrationDetails::validate(email, username, password)
            .expect_err("input must be rejected");
        assert_eq!(error, FieldError::new(field, message));
    }

    #[rstest]
    fn first_failing_rule_wins() {
        let error = RegistrationDetails::validate("nope", "x", "y").expect_err("rejected");
        assert_eq!(error.field, "email");

        let error = RegistrationDetails::validate("a@b", "x@", "y").expect_err("rejected");
        assert_eq!(error.message, "length must be greater than 2");
    }

    #[rstest]
    fn username_length_counts_characters() {
        assert!(RegistrationDetails::validate("a@b.com", "ééé", "secret").is_ok());
    }

    #[rstest]
    #[case("bob", LoginIdentifier::Username("bob".to_owned()))]
    #[case("bob@example.com", LoginIdentifier::Email("bob@example.com".to_owned()))]
    fn login_identifier_is_classified_by_at_sign(
        #[case] raw: &str,
        #[case] expected: LoginIdentifier,
    ) {
        assert_eq!(LoginIdentifier::parse(raw), expected);
    }

    #[rstest]
    #[case("abc", false)]
    #[case("abcd", true)]
    fn new_password_requires_four_characters(#[case] raw: &str, #[case] accepted: bool) {
        let result = NewPassword::validate(raw);
        assert_eq!(result.is_ok(), accepted);
        if let Err(error) = result {
            assert_eq!(error.field, "newPassword");
        }
    }

    #[rstest]
    fn reset_link_tolerates_trailing_slash() {
        let token: ResetToken = "3fa85f64-5717-4562-b3fc-2c963f66afa6"
            .parse()
            .expect("uuid");
        assert_eq!(
            token.reset_link("http://localhost:3000/"),
            "http://localhost:3000/change-password/3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
    }

    #[rstest]
    fn reset_token_ttl_is_three_days() {
        assert_eq!(RESET_TOKEN_TTL.as_secs(), 259_200);
    }
}
