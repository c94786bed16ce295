//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Post, PostId, User, UserId};

use super::schema::{posts, users, votes};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self::from_parts(
            UserId::from_uuid(row.id),
            row.username,
            row.email,
            row.password_hash,
            row.created_at,
            row.updated_at,
        )
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username(),
            email: user.email(),
            password_hash: user.password_hash(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Changeset for replacing a user's password hash.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct PasswordUpdate<'a> {
    pub password_hash: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub points: i32,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::from_uuid(row.id),
            title: row.title,
            text: row.text,
            points: row.points,
            creator_id: UserId::from_uuid(row.creator_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating new posts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub text: &'a str,
    pub points: i32,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Post> for NewPostRow<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            id: *post.id.as_uuid(),
            title: &post.title,
            text: &post.text,
            points: post.points,
            creator_id: *post.creator_id.as_uuid(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Changeset for editing a post's title and text.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
pub(crate) struct PostUpdate<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the vote ledger.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub value: i16,
}
