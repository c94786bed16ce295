//! Driving port for post reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, PostDetails, PostId, UserId};

/// Post listings and lookups.
///
/// `viewer` is the signed-in user, if any; it decides each post's vote
/// status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// Newest-first page of posts.
    async fn list(
        &self,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<Page<PostDetails>, Error>;

    /// A single post, `None` when it does not exist.
    async fn get(&self, viewer: Option<UserId>, post_id: PostId)
    -> Result<Option<PostDetails>, Error>;
}
