//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, AccountQuery, PostCommand, PostQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and password reset.
    pub accounts: Arc<dyn AccountCommand>,
    /// Current-user lookup.
    pub accounts_query: Arc<dyn AccountQuery>,
    /// Post creation, edits, deletion and votes.
    pub posts: Arc<dyn PostCommand>,
    /// Post listings and single-post reads.
    pub posts_query: Arc<dyn PostQuery>,
}

impl HttpState {
    /// Bundle the driving ports handlers depend on.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{AccountCommand, AccountQuery, PostCommand, PostQuery};
    /// use backend::inbound::http::state::HttpState;
    ///
    /// fn wire(
    ///     accounts: Arc<dyn AccountCommand>,
    ///     me: Arc<dyn AccountQuery>,
    ///     posts: Arc<dyn PostCommand>,
    ///     feed: Arc<dyn PostQuery>,
    /// ) -> HttpState {
    ///     HttpState::new(accounts, me, posts, feed)
    /// }
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        accounts_query: Arc<dyn AccountQuery>,
        posts: Arc<dyn PostCommand>,
        posts_query: Arc<dyn PostQuery>,
    ) -> Self {
        Self {
            accounts,
            accounts_query,
            posts,
            posts_query,
        }
    }
}
