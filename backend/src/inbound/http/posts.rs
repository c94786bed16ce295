//! Post API handlers.
//!
//! ```text
//! GET    /api/v1/posts?limit=10&cursor=1628500554962
//! GET    /api/v1/posts/{id}
//! POST   /api/v1/posts {"title":"Hello","text":"World"}
//! PUT    /api/v1/posts/{id} {"title":"Hello","text":"again"}
//! DELETE /api/v1/posts/{id}
//! POST   /api/v1/posts/{id}/vote {"value":1}
//! ```
//!
//! Reads are open to anonymous callers; mutations require a session.

use actix_web::{delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{PageRequest, TimestampCursor};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{CreatePostRequest, UpdatePostRequest, VoteRequest};
use crate::domain::{Error, Post, PostDetails, PostId, UserId, UserView, VoteValue};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Page size used when the client does not send `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Query parameters for `GET /api/v1/posts`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Page size, clamped to `1..=50`.
    pub limit: Option<i64>,
    /// `nextCursor` from the previous page, or the `createdAt` of the last
    /// post already seen in epoch milliseconds.
    pub cursor: Option<String>,
}

/// Title and body for creating or replacing a post.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PostBody {
    /// Headline.
    #[schema(example = "Hello")]
    pub title: String,
    /// Body text.
    #[schema(example = "First post")]
    pub text: String,
}

/// Body for `POST /api/v1/posts/{id}/vote`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VoteBody {
    /// Negative values downvote; zero and positive values upvote.
    #[schema(example = 1)]
    pub value: i32,
}

/// Post fields shared by every post response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: PostId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub text: String,
    /// First fifty characters of `text`.
    pub text_snippet: String,
    /// Sum of all votes.
    pub points: i32,
    /// Author id.
    #[schema(value_type = String)]
    pub creator_id: UserId,
    /// Creation time; also the pagination key.
    pub created_at: DateTime<Utc>,
    /// Last edit.
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        let text_snippet = post.text_snippet().to_owned();
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            text_snippet,
            points: post.points,
            creator_id: post.creator_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// A post as listed: its fields, author and the viewer's vote.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailsView {
    /// Post fields.
    #[serde(flatten)]
    pub post: PostView,
    /// Author, with the email hidden from everybody but the author.
    pub creator: UserView,
    /// Viewer's vote, `null` when anonymous or not voted.
    pub vote_status: Option<VoteValue>,
}

impl PostDetailsView {
    fn new(details: PostDetails, viewer: Option<&UserId>) -> Self {
        let creator = details.creator.view_for(viewer);
        Self {
            post: details.post.into(),
            creator,
            vote_status: details.vote_status,
        }
    }
}

/// One page of the post feed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPosts {
    /// Posts, newest first.
    pub posts: Vec<PostDetailsView>,
    /// Whether an older page exists.
    pub has_more: bool,
    /// Cursor for the next page; `null` on the last page.
    #[schema(example = "1628500554962:67e55044-10b1-426f-9247-bb680e5fe0c8")]
    pub next_cursor: Option<String>,
}

fn page_request(query: &ListPostsQuery) -> ApiResult<PageRequest> {
    PageRequest::parse(
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        query.cursor.as_deref(),
    )
    .map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "cursor" }))
    })
}

/// List posts newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "A page of posts", body = PaginatedPosts),
        (status = 400, description = "Malformed cursor", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["posts"],
    operation_id = "posts"
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListPostsQuery>,
) -> ApiResult<web::Json<PaginatedPosts>> {
    let request = page_request(&query)?;
    let viewer = session.user_id()?;
    let page = state.posts_query.list(viewer, request).await?;
    let next_cursor = page
        .items
        .last()
        .filter(|_| page.has_more)
        .map(|last| TimestampCursor::at(last.post.created_at, *last.post.id.as_uuid()).to_string());
    Ok(web::Json(PaginatedPosts {
        has_more: page.has_more,
        next_cursor,
        posts: page
            .items
            .into_iter()
            .map(|details| PostDetailsView::new(details, viewer.as_ref()))
            .collect(),
    }))
}

/// Fetch one post, or `null` when it does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "The post or null", body = PostDetailsView),
        (status = 400, description = "Malformed id", body = Error)
    ),
    tags = ["posts"],
    operation_id = "post"
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Option<PostDetailsView>>> {
    let viewer = session.user_id()?;
    let post_id = PostId::from_uuid(path.into_inner());
    let details = state.posts_query.get(viewer, post_id).await?;
    Ok(web::Json(
        details.map(|found| PostDetailsView::new(found, viewer.as_ref())),
    ))
}

/// Publish a post as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostBody,
    responses(
        (status = 200, description = "Created post", body = PostView),
        (status = 400, description = "Blank title or text", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PostBody>,
) -> ApiResult<web::Json<PostView>> {
    let creator = session.require_user_id()?;
    let PostBody { title, text } = payload.into_inner();
    let post = state
        .posts
        .create(CreatePostRequest {
            creator,
            title,
            text,
        })
        .await?;
    Ok(web::Json(post.into()))
}

/// Replace title and text of a post the caller wrote.
///
/// Answers `null` when the post is missing or belongs to someone else.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    request_body = PostBody,
    responses(
        (status = 200, description = "Updated post or null", body = PostView),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<PostBody>,
) -> ApiResult<web::Json<Option<PostView>>> {
    let actor = session.require_user_id()?;
    let PostBody { title, text } = payload.into_inner();
    let updated = state
        .posts
        .update(UpdatePostRequest {
            actor,
            post_id: PostId::from_uuid(path.into_inner()),
            title,
            text,
        })
        .await?;
    Ok(web::Json(updated.map(PostView::from)))
}

/// Delete a post the caller wrote. Always `true`, even when nothing matched.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Delete processed", body = bool),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<bool>> {
    let actor = session.require_user_id()?;
    let post_id = PostId::from_uuid(path.into_inner());
    let deleted = state.posts.delete(&actor, &post_id).await?;
    Ok(web::Json(deleted))
}

/// Cast, flip, or repeat a vote on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/vote",
    params(("id" = Uuid, Path, description = "Post identifier")),
    request_body = VoteBody,
    responses(
        (status = 200, description = "Vote recorded", body = bool),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "vote"
)]
#[post("/posts/{id}/vote")]
pub async fn vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<VoteBody>,
) -> ApiResult<web::Json<bool>> {
    let voter = session.require_user_id()?;
    state
        .posts
        .vote(VoteRequest {
            voter,
            post_id: PostId::from_uuid(path.into_inner()),
            value: payload.value,
        })
        .await?;
    Ok(web::Json(true))
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
