//! Post data model.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{Error, User, UserId, VoteValue};

/// Number of characters kept by [`Post::text_snippet`].
pub const SNIPPET_CHARS: usize = 50;

/// Stable post identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`PostId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A forum post.
///
/// `points` caches the sum of the post's votes; only the vote ledger
/// changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Stable identifier.
    pub id: PostId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub text: String,
    /// Sum of all votes on the post.
    pub points: i32,
    /// Author.
    pub creator_id: UserId,
    /// Creation time; listings are ordered and paginated on it.
    pub created_at: DateTime<Utc>,
    /// Last edit.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a new, unvoted post.
    ///
    /// Timestamps are truncated to milliseconds, the precision of listing
    /// cursors.
    #[must_use]
    pub fn publish(creator_id: UserId, draft: PostDraft, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(3);
        Self {
            id: PostId::random(),
            title: draft.title,
            text: draft.text,
            points: 0,
            creator_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// The first [`SNIPPET_CHARS`] characters of the body.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Post, PostDraft, UserId};
    /// use chrono::Utc;
    ///
    /// let draft = PostDraft::new("Hello", &"é".repeat(60)).expect("valid draft");
    /// let post = Post::publish(UserId::random(), draft, Utc::now());
    /// assert_eq!(post.text_snippet().chars().count(), 50);
    /// ```
    #[must_use]
    pub fn text_snippet(&self) -> &str {
        match self.text.char_indices().nth(SNIPPET_CHARS) {
            Some((end, _)) => self.text.get(..end).unwrap_or(&self.text),
            None => &self.text,
        }
    }
}

/// Validated input for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    text: String,
}

impl PostDraft {
    /// Require a non-blank title and body.
    ///
    /// # Errors
    /// Returns [`Error::invalid_request`] with `{"field": ...}` details naming
    /// the first blank field.
    pub fn new(title: &str, text: &str) -> Result<Self, Error> {
        for (field, value) in [("title", title), ("text", text)] {
            if value.trim().is_empty() {
                return Err(Error::invalid_request(format!("{field} must not be empty"))
                    .with_details(json!({ "field": field })));
            }
        }
        Ok(Self {
            title: title.to_owned(),
            text: text.to_owned(),
        })
    }

    /// Headline.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Replacement title and text for an existing post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEdit {
    /// New headline.
    pub title: String,
    /// New body text.
    pub text: String,
}

/// A post together with the data a listing shows beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetails {
    /// The post itself.
    pub post: Post,
    /// Author record.
    pub creator: User,
    /// The viewer's current vote, `None` when anonymous or not voted.
    pub vote_status: Option<VoteValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn post_with_text(text: &str) -> Post {
        let draft = PostDraft::new("title", text).expect("valid draft");
        Post::publish(UserId::random(), draft, Utc::now())
    }

    #[rstest]
    #[case("short", "short")]
    #[case(&"a".repeat(50), &"a".repeat(50))]
    #[case(&"a".repeat(51), &"a".repeat(50))]
    fn snippet_keeps_at_most_fifty_characters(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(post_with_text(text).text_snippet(), expected);
    }

    #[rstest]
    fn snippet_respects_char_boundaries() {
        let post = post_with_text(&"ü".repeat(80));
        assert_eq!(post.text_snippet(), "ü".repeat(50));
    }

    #[rstest]
    #[case("", "body", "title")]
    #[case("   ", "body", "title")]
    #[case("headline", "", "text")]
    fn blank_fields_are_rejected(#[case] title: &str, #[case] text: &str, #[case] field: &str) {
        let error = PostDraft::new(title, text).expect_err("blank field");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details(), Some(&json!({ "field": field })));
    }

    #[rstest]
    fn published_post_starts_at_zero_points() {
        let post = post_with_text("body");
        assert_eq!(post.points, 0);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[rstest]
    fn published_timestamps_drop_sub_millisecond_precision() {
        let now = chrono::TimeZone::timestamp_opt(&Utc, 1_628_503_200, 600_900)
            .single()
            .expect("valid timestamp");
        let draft = PostDraft::new("title", "body").expect("valid draft");
        let post = Post::publish(UserId::random(), draft, now);
        assert_eq!(post.created_at.timestamp_subsec_nanos(), 0);
        assert_eq!(post.created_at.timestamp_millis(), now.timestamp_millis());
    }
}
