//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{PostPersistenceError, PostRepository};
use crate::domain::{Post, PostEdit, PostId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPostRow, PostRow, PostUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::posts;

/// Diesel-backed implementation of the [`PostRepository`] port.
///
/// Listings use the `posts_created_at_idx` index: rows past the
/// `(created_at, id)` cursor, newest first, limited to the request's fetch
/// size.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> PostPersistenceError {
    map_pool_error(error, PostPersistenceError::connection)
}

fn diesel_error(error: &DieselError) -> PostPersistenceError {
    map_diesel_error(
        error,
        PostPersistenceError::query,
        PostPersistenceError::connection,
    )
}

fn fetch_limit(request: &PageRequest) -> i64 {
    i64::try_from(request.fetch_size()).unwrap_or(i64::MAX)
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn create(&self, post: &Post) -> Result<(), PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(posts::table)
            .values(NewPostRow::from(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| diesel_error(&err))
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        posts::table
            .find(*id.as_uuid())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Post::from))
            .map_err(|err| diesel_error(&err))
    }

    async fn list_page(&self, request: &PageRequest) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = posts::table
            .select(PostRow::as_select())
            .order_by((posts::created_at.desc(), posts::id.desc()))
            .limit(fetch_limit(request))
            .into_boxed();
        if let Some(cursor) = request.cursor() {
            let at = cursor.timestamp();
            query = match cursor.tiebreak() {
                Some(last_id) => query.filter(
                    posts::created_at
                        .lt(at)
                        .or(posts::created_at.eq(at).and(posts::id.lt(last_id))),
                ),
                None => query.filter(posts::created_at.lt(at)),
            };
        }
        query
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Post::from).collect())
            .map_err(|err| diesel_error(&err))
    }

    async fn update_owned(
        &self,
        id: &PostId,
        creator: &UserId,
        edit: &PostEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            posts::table
                .filter(posts::id.eq(*id.as_uuid()))
                .filter(posts::creator_id.eq(*creator.as_uuid())),
        )
        .set(PostUpdate {
            title: &edit.title,
            text: &edit.text,
            updated_at,
        })
        .returning(PostRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map(|row| row.map(Post::from))
        .map_err(|err| diesel_error(&err))
    }

    async fn delete_owned(
        &self,
        id: &PostId,
        creator: &UserId,
    ) -> Result<bool, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(
            posts::table
                .filter(posts::id.eq(*id.as_uuid()))
                .filter(posts::creator_id.eq(*creator.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|affected| affected > 0)
        .map_err(|err| diesel_error(&err))
    }
}
