//! Port abstraction for post persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{Post, PostEdit, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by post repository adapters.
    pub enum PostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
    }
}

/// Storage for posts.
///
/// Ownership checks live in the predicates of [`update_owned`] and
/// [`delete_owned`]: a post that exists but belongs to someone else behaves
/// exactly like a missing one.
///
/// [`update_owned`]: PostRepository::update_owned
/// [`delete_owned`]: PostRepository::delete_owned
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post.
    async fn create(&self, post: &Post) -> Result<(), PostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// Newest-first posts past the request's `(created_at, id)` cursor.
    ///
    /// Returns up to [`PageRequest::fetch_size`] rows so the caller can tell
    /// whether another page exists.
    async fn list_page(&self, request: &PageRequest) -> Result<Vec<Post>, PostPersistenceError>;

    /// Overwrite title and text when `creator` owns the post.
    ///
    /// Returns the updated post, or `None` when nothing matched.
    async fn update_owned(
        &self,
        id: &PostId,
        creator: &UserId,
        edit: &PostEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, PostPersistenceError>;

    /// Delete the post when `creator` owns it; returns whether a row went.
    async fn delete_owned(&self, id: &PostId, creator: &UserId)
    -> Result<bool, PostPersistenceError>;
}
