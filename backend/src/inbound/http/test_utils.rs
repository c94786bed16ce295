//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::{TimeZone, Utc};

use crate::domain::User;
use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockPostCommand, MockPostQuery,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Driving-port mocks, one per handler dependency.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub accounts_query: MockAccountQuery,
    pub posts: MockPostCommand,
    pub posts_query: MockPostQuery,
}

impl MockPorts {
    /// Freeze the configured expectations into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.accounts),
            Arc::new(self.accounts_query),
            Arc::new(self.posts),
            Arc::new(self.posts_query),
        )
    }
}

/// A registered user with deterministic timestamps.
pub fn sample_user(username: &str) -> User {
    let at = Utc
        .with_ymd_and_hms(2021, 8, 9, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    User::register(
        crate::domain::UserId::random(),
        username,
        format!("{username}@example.com"),
        "$argon2id$fixture",
        at,
    )
}

/// The `session` cookie a response set, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}
