//! Port for the vote ledger: the per-user vote rows and the cached points
//! they add up to.
use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{PostId, UserId, VoteTransition, VoteValue};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote ledger adapters.
    pub enum VoteLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } => "vote ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vote ledger query failed: {message}",
        /// The post being voted on does not exist.
        PostNotFound { post_id: PostId } => "post {post_id} not found",
    }
}

/// Vote storage that keeps `posts.points` equal to the sum of vote rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Record `value` from `voter` on `post`.
    ///
    /// Implementations read the existing vote, plan with
    /// [`VoteTransition::plan`], write the ledger row and adjust the post's
    /// points atomically, and return the executed transition.
    async fn apply_vote(
        &self,
        voter: &UserId,
        post: &PostId,
        value: VoteValue,
    ) -> Result<VoteTransition, VoteLedgerError>;

    /// The votes `voter` holds on any of `posts`.
    async fn vote_statuses(
        &self,
        voter: &UserId,
        posts: &[PostId],
    ) -> Result<HashMap<PostId, VoteValue>, VoteLedgerError>;

    /// Sum of the ledger rows for `post`, independent of the cached points.
    async fn ledger_total(&self, post: &PostId) -> Result<i64, VoteLedgerError>;
}
