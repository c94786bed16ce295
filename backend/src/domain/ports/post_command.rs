//! Driving port for post mutations and voting.

use async_trait::async_trait;

use crate::domain::{Error, Post, PostId, UserId, VoteTransition};

/// Input for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    /// Signed-in author.
    pub creator: UserId,
    /// Headline; must not be blank.
    pub title: String,
    /// Body; must not be blank.
    pub text: String,
}

/// Input for editing a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePostRequest {
    /// Signed-in user; only the author's edits apply.
    pub actor: UserId,
    /// Post to edit.
    pub post_id: PostId,
    /// New headline.
    pub title: String,
    /// New body.
    pub text: String,
}

/// Input for a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRequest {
    /// Signed-in voter.
    pub voter: UserId,
    /// Post being voted on.
    pub post_id: PostId,
    /// Raw client value, normalised by sign.
    pub value: i32,
}

/// Post mutations.
///
/// Edits and deletes by someone other than the author are silent no-ops:
/// `update` answers `None` and `delete` still answers `true`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish a post.
    async fn create(&self, request: CreatePostRequest) -> Result<Post, Error>;

    /// Edit a post the actor owns.
    async fn update(&self, request: UpdatePostRequest) -> Result<Option<Post>, Error>;

    /// Delete a post the actor owns.
    async fn delete(&self, actor: &UserId, post_id: &PostId) -> Result<bool, Error>;

    /// Record a vote and update the post's points in one transaction.
    async fn vote(&self, request: VoteRequest) -> Result<VoteTransition, Error>;
}
