//! Runtime settings and the HTTP server configuration object.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use backend::inbound::http::session_config::SessionSettings;
use backend::inbound::http::state::HttpState;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000";

/// Deployment settings loaded via OrthoConfig from CLI flags, `FORUM_*`
/// environment variables, and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FORUM")]
#[serde(default)]
pub struct ForumSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Redis connection string for password reset tokens.
    pub redis_url: Option<String>,
    /// Upper bound on connections in each pool.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Origin of the web client; reset links are built under it.
    pub reset_link_base: Option<String>,
}

impl Default for ForumSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            redis_url: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            reset_link_base: None,
        }
    }
}

/// A setting the server cannot start without is absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required setting {name} (set FORUM_{env_suffix} or --{flag})")]
pub struct MissingSetting {
    name: &'static str,
    env_suffix: &'static str,
    flag: &'static str,
}

impl ForumSettings {
    /// Listener address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// PostgreSQL URL.
    pub fn database_url(&self) -> Result<&str, MissingSetting> {
        self.database_url.as_deref().ok_or(MissingSetting {
            name: "database_url",
            env_suffix: "DATABASE_URL",
            flag: "database-url",
        })
    }

    /// Redis URL.
    pub fn redis_url(&self) -> Result<&str, MissingSetting> {
        self.redis_url.as_deref().ok_or(MissingSetting {
            name: "redis_url",
            env_suffix: "REDIS_URL",
            flag: "redis-url",
        })
    }

    /// Pool size, defaulting to ten connections; zero is raised to one.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.max(1)
    }

    /// Reset link origin without a trailing slash.
    pub fn reset_link_base(&self) -> &str {
        self.reset_link_base
            .as_deref()
            .unwrap_or(DEFAULT_RESET_LINK_BASE)
            .trim_end_matches('/')
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Combine validated session settings with the wired application state.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, http_state: HttpState) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            ttl,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl: ttl,
            bind_addr,
            http_state,
        }
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(not(test), expect(dead_code, reason = "Exercised by server tests"))]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
