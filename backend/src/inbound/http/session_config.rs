//! Session cookie configuration parsing and validation.
//!
//! Cookie sessions hold the signed-in user id, encrypted with a key read
//! from disk. Debug builds fall back to defaults (with a warning) for every
//! missing or malformed toggle; release builds require explicit, valid
//! values so a misconfigured deployment fails at startup.

use std::path::PathBuf;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const TTL_HOURS_ENV: &str = "SESSION_TTL_HOURS";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "a positive number of hours";

/// Session lifetime when `SESSION_TTL_HOURS` is unset: thirty days.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
    /// How long a session stays valid after it was last written.
    pub ttl: Duration,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value found.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// One environment toggle as found.
enum Toggle<T> {
    Set(T),
    Missing,
    Invalid(String),
}

fn read_toggle<E: Env, T>(env: &E, name: &str, parse: fn(&str) -> Option<T>) -> Toggle<T> {
    match env.string(name) {
        Some(raw) => parse(&raw).map_or(Toggle::Invalid(raw), Toggle::Set),
        None => Toggle::Missing,
    }
}

/// Apply the build-mode policy: debug builds warn and use `fallback`,
/// release builds refuse to start.
fn resolve<T>(
    toggle: Toggle<T>,
    name: &'static str,
    expected: &'static str,
    mode: BuildMode,
    fallback: T,
) -> Result<T, SessionConfigError> {
    match toggle {
        Toggle::Set(value) => Ok(value),
        Toggle::Missing if mode.is_debug() => {
            warn!(variable = name, "session toggle not set; using default");
            Ok(fallback)
        }
        Toggle::Missing => Err(SessionConfigError::MissingEnv { name }),
        Toggle::Invalid(value) if mode.is_debug() => {
            warn!(variable = name, %value, "invalid session toggle; using default");
            Ok(fallback)
        }
        Toggle::Invalid(value) => Err(SessionConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
    }
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use backend::inbound::http::session_config::{session_settings_from_env, BuildMode};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
///
/// # Errors
///
/// Returns a [`SessionConfigError`] when a release build is missing a toggle
/// or any build finds a value it cannot honour.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = resolve(
        read_toggle(env, COOKIE_SECURE_ENV, parse_bool),
        COOKIE_SECURE_ENV,
        BOOL_EXPECTED,
        mode,
        true,
    )?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = resolve(
        read_toggle(env, ALLOW_EPHEMERAL_ENV, parse_bool),
        ALLOW_EPHEMERAL_ENV,
        BOOL_EXPECTED,
        mode,
        false,
    )?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let ttl = ttl_from_env(env, mode)?;
    let key = session_key_from_env(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl,
    })
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let same_site = resolve(
        read_toggle(env, SAMESITE_ENV, parse_same_site),
        SAMESITE_ENV,
        SAMESITE_EXPECTED,
        mode,
        SameSite::Lax,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        if !mode.is_debug() {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SESSION_SAMESITE=None with SESSION_COOKIE_SECURE=0; browsers may reject the cookie");
    }
    Ok(same_site)
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, SessionConfigError> {
    let hours = match read_toggle(env, TTL_HOURS_ENV, parse_hours) {
        Toggle::Missing => DEFAULT_SESSION_TTL_HOURS,
        toggle => resolve(
            toggle,
            TTL_HOURS_ENV,
            TTL_EXPECTED,
            mode,
            DEFAULT_SESSION_TTL_HOURS,
        )?,
    };
    Ok(Duration::hours(hours))
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

fn parse_hours(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|hours| *hours > 0)
}

#[cfg(test)]
#[path = "session_config_tests.rs"]
mod tests;
