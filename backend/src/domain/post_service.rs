//! Post domain service.
//!
//! Implements [`PostCommand`] and [`PostQuery`]. Listings resolve creators
//! with one batched user lookup per page and the viewer's votes with one
//! ledger lookup per page.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{debug, info};

use crate::domain::ports::{
    CreatePostRequest, PostCommand, PostPersistenceError, PostQuery, PostRepository,
    UpdatePostRequest, UserPersistenceError, UserRepository, VoteLedger, VoteLedgerError,
    VoteRequest,
};
use crate::domain::{
    Error, Post, PostDetails, PostDraft, PostEdit, PostId, User, UserId, VoteTransition,
    VoteValue,
};

/// Post service implementing the post driving ports.
#[derive(Clone)]
pub struct PostService<P, U, V> {
    posts: Arc<P>,
    users: Arc<U>,
    ledger: Arc<V>,
    clock: Arc<dyn Clock>,
}

impl<P, U, V> PostService<P, U, V> {
    /// Create a new service with the given ports.
    pub fn new(posts: Arc<P>, users: Arc<U>, ledger: Arc<V>, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts,
            users,
            ledger,
            clock,
        }
    }
}

fn map_post_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostPersistenceError::Query { message } => {
            Error::internal(format!("post repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn map_ledger_error(error: VoteLedgerError) -> Error {
    match error {
        VoteLedgerError::Connection { message } => {
            Error::service_unavailable(format!("vote ledger unavailable: {message}"))
        }
        VoteLedgerError::Query { message } => {
            Error::internal(format!("vote ledger error: {message}"))
        }
        VoteLedgerError::PostNotFound { post_id } => {
            Error::not_found(format!("post {post_id} not found"))
        }
    }
}

impl<P, U, V> PostService<P, U, V>
where
    P: PostRepository,
    U: UserRepository,
    V: VoteLedger,
{
    async fn creators_for(&self, posts: &[Post]) -> Result<HashMap<UserId, User>, Error> {
        let ids: Vec<UserId> = posts
            .iter()
            .map(|post| post.creator_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self
            .users
            .find_by_ids(&ids)
            .await
            .map_err(map_user_error)?;
        Ok(users.into_iter().map(|user| (user.id(), user)).collect())
    }

    async fn vote_statuses_for(
        &self,
        viewer: Option<UserId>,
        posts: &[Post],
    ) -> Result<HashMap<PostId, VoteValue>, Error> {
        let Some(viewer) = viewer else {
            return Ok(HashMap::new());
        };
        if posts.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<PostId> = posts.iter().map(|post| post.id).collect();
        self.ledger
            .vote_statuses(&viewer, &ids)
            .await
            .map_err(map_ledger_error)
    }

    async fn with_details(
        &self,
        viewer: Option<UserId>,
        posts: Vec<Post>,
    ) -> Result<Vec<PostDetails>, Error> {
        let creators = self.creators_for(&posts).await?;
        let statuses = self.vote_statuses_for(viewer, &posts).await?;
        posts
            .into_iter()
            .map(|post| {
                let creator = creators.get(&post.creator_id).cloned().ok_or_else(|| {
                    Error::internal(format!(
                        "creator {} of post {} missing",
                        post.creator_id, post.id
                    ))
                })?;
                let vote_status = statuses.get(&post.id).copied();
                Ok(PostDetails {
                    post,
                    creator,
                    vote_status,
                })
            })
            .collect()
    }
}

#[async_trait]
impl<P, U, V> PostCommand for PostService<P, U, V>
where
    P: PostRepository,
    U: UserRepository,
    V: VoteLedger,
{
    async fn create(&self, request: CreatePostRequest) -> Result<Post, Error> {
        let draft = PostDraft::new(&request.title, &request.text)?;
        let post = Post::publish(request.creator, draft, self.clock.utc());
        self.posts.create(&post).await.map_err(map_post_error)?;
        info!(post_id = %post.id, creator_id = %post.creator_id, "created post");
        Ok(post)
    }

    async fn update(&self, request: UpdatePostRequest) -> Result<Option<Post>, Error> {
        let edit = PostEdit {
            title: request.title,
            text: request.text,
        };
        let updated = self
            .posts
            .update_owned(&request.post_id, &request.actor, &edit, self.clock.utc())
            .await
            .map_err(map_post_error)?;
        if updated.is_none() {
            debug!(
                post_id = %request.post_id,
                actor = %request.actor,
                "update matched no owned post"
            );
        }
        Ok(updated)
    }

    async fn delete(&self, actor: &UserId, post_id: &PostId) -> Result<bool, Error> {
        let deleted = self
            .posts
            .delete_owned(post_id, actor)
            .await
            .map_err(map_post_error)?;
        if deleted {
            info!(%post_id, %actor, "deleted post");
        } else {
            debug!(%post_id, %actor, "delete matched no owned post");
        }
        Ok(true)
    }

    async fn vote(&self, request: VoteRequest) -> Result<VoteTransition, Error> {
        let value = VoteValue::from_raw(request.value);
        let transition = self
            .ledger
            .apply_vote(&request.voter, &request.post_id, value)
            .await
            .map_err(map_ledger_error)?;
        info!(
            post_id = %request.post_id,
            voter = %request.voter,
            transition = transition.kind(),
            delta = transition.points_delta(),
            "applied vote"
        );
        Ok(transition)
    }
}

#[async_trait]
impl<P, U, V> PostQuery for PostService<P, U, V>
where
    P: PostRepository,
    U: UserRepository,
    V: VoteLedger,
{
    async fn list(
        &self,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<Page<PostDetails>, Error> {
        let rows = self
            .posts
            .list_page(&request)
            .await
            .map_err(map_post_error)?;
        let page = Page::from_overfetched(rows, &request);
        let items = self.with_details(viewer, page.items).await?;
        Ok(Page {
            items,
            has_more: page.has_more,
        })
    }

    async fn get(
        &self,
        viewer: Option<UserId>,
        post_id: PostId,
    ) -> Result<Option<PostDetails>, Error> {
        let Some(post) = self
            .posts
            .find_by_id(&post_id)
            .await
            .map_err(map_post_error)?
        else {
            return Ok(None);
        };
        let mut details = self.with_details(viewer, vec![post]).await?;
        Ok(details.pop())
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
