//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` and `email` carry the `users_username_key` and
    /// `users_email_key` unique constraints.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Unique email address.
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Forum posts.
    posts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Headline.
        title -> Varchar,
        /// Body text.
        text -> Text,
        /// Cached sum of `votes.value` for this post.
        points -> Int4,
        /// Author; cascades on user deletion.
        creator_id -> Uuid,
        /// Creation timestamp, used as the pagination key.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vote ledger: one row per `(user, post)`.
    votes (user_id, post_id) {
        /// Voter; cascades on user deletion.
        user_id -> Uuid,
        /// Post voted on; cascades on post deletion.
        post_id -> Uuid,
        /// `1` or `-1`, enforced by `votes_value_check`.
        value -> Int2,
    }
}

diesel::joinable!(posts -> users (creator_id));
diesel::joinable!(votes -> posts (post_id));
diesel::joinable!(votes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(posts, users, votes);
