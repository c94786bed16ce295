//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`, via
//! the `test-support` feature). [`InMemoryForum`] implements every storage
//! port over one mutex, so a vote's read-plan-write sequence is atomic just
//! as it is inside the PostgreSQL transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use pagination::PageRequest;

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, PasswordResetNotifier, PostPersistenceError,
    PostRepository, ResetNotificationError, TokenStore, TokenStoreError, UniqueUserField,
    UserPersistenceError, UserRepository, VoteLedger, VoteLedgerError,
};
use crate::domain::{Post, PostEdit, PostId, User, UserId, VoteTransition, VoteValue};

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// A clock that always reads `now`.
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self { utc_now: now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock that moves forward by a fixed step on every reading, so records
/// created one after another get strictly increasing timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    /// First reading is `start`; each later one is `step` after the last.
    pub const fn starting_at(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = self
            .next
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = *next;
        *next = now + self.step;
        now
    }
}

#[derive(Default)]
struct ForumState {
    users: HashMap<UserId, User>,
    posts: HashMap<PostId, Post>,
    votes: HashMap<(UserId, PostId), VoteValue>,
    tokens: HashMap<String, (String, Instant)>,
}

/// In-memory users, posts, vote ledger and token store.
#[derive(Clone, Default)]
pub struct InMemoryForum {
    state: Arc<Mutex<ForumState>>,
}

impl InMemoryForum {
    /// An empty forum.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, ForumState>, E> {
        self.state
            .lock()
            .map_err(|_| poisoned("in-memory forum lock poisoned"))
    }

    /// Cached points of a post, if it exists.
    pub fn points_of(&self, post: &PostId) -> Option<i32> {
        self.lock(|_| ())
            .ok()
            .and_then(|state| state.posts.get(post).map(|found| found.points))
    }

    /// Number of ledger rows.
    pub fn vote_count(&self) -> usize {
        self.lock(|_| ()).map_or(0, |state| state.votes.len())
    }
}

#[async_trait]
impl UserRepository for InMemoryForum {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::connection)?;
        if state.users.values().any(|u| u.username() == user.username()) {
            return Err(UserPersistenceError::duplicate(UniqueUserField::Username));
        }
        if state.users.values().any(|u| u.email() == user.email()) {
            return Err(UserPersistenceError::duplicate(UniqueUserField::Email));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::connection)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::connection)?;
        Ok(state
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::connection)?;
        Ok(state.users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::connection)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::connection)?;
        let Some(existing) = state.users.get(id) else {
            return Ok(false);
        };
        let replaced = User::from_parts(
            existing.id(),
            existing.username().to_owned(),
            existing.email().to_owned(),
            password_hash.to_owned(),
            existing.created_at(),
            updated_at,
        );
        state.users.insert(*id, replaced);
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for InMemoryForum {
    async fn create(&self, post: &Post) -> Result<(), PostPersistenceError> {
        let mut state = self.lock(PostPersistenceError::connection)?;
        if !state.users.contains_key(&post.creator_id) {
            return Err(PostPersistenceError::query("creator does not exist"));
        }
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let state = self.lock(PostPersistenceError::connection)?;
        Ok(state.posts.get(id).cloned())
    }

    async fn list_page(&self, request: &PageRequest) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.lock(PostPersistenceError::connection)?;
        let mut rows: Vec<Post> = state
            .posts
            .values()
            .filter(|post| {
                request
                    .cursor()
                    .is_none_or(|cursor| cursor.admits(post.created_at, post.id.as_uuid()))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(request.fetch_size());
        Ok(rows)
    }

    async fn update_owned(
        &self,
        id: &PostId,
        creator: &UserId,
        edit: &PostEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, PostPersistenceError> {
        let mut state = self.lock(PostPersistenceError::connection)?;
        let Some(post) = state
            .posts
            .get_mut(id)
            .filter(|post| post.creator_id == *creator)
        else {
            return Ok(None);
        };
        post.title.clone_from(&edit.title);
        post.text.clone_from(&edit.text);
        post.updated_at = updated_at;
        Ok(Some(post.clone()))
    }

    async fn delete_owned(
        &self,
        id: &PostId,
        creator: &UserId,
    ) -> Result<bool, PostPersistenceError> {
        let mut state = self.lock(PostPersistenceError::connection)?;
        let owned = state
            .posts
            .get(id)
            .is_some_and(|post| post.creator_id == *creator);
        if owned {
            state.posts.remove(id);
            state.votes.retain(|(_, post), _| post != id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl VoteLedger for InMemoryForum {
    async fn apply_vote(
        &self,
        voter: &UserId,
        post: &PostId,
        value: VoteValue,
    ) -> Result<VoteTransition, VoteLedgerError> {
        let mut state = self.lock(VoteLedgerError::connection)?;
        if !state.posts.contains_key(post) {
            return Err(VoteLedgerError::post_not_found(*post));
        }
        let key = (*voter, *post);
        let transition = VoteTransition::plan(state.votes.get(&key).copied(), value);
        if matches!(transition, VoteTransition::Unchanged(_)) {
            return Ok(transition);
        }
        state.votes.insert(key, transition.resulting_value());
        if let Some(target) = state.posts.get_mut(post) {
            target.points += transition.points_delta();
        }
        Ok(transition)
    }

    async fn vote_statuses(
        &self,
        voter: &UserId,
        post_ids: &[PostId],
    ) -> Result<HashMap<PostId, VoteValue>, VoteLedgerError> {
        let state = self.lock(VoteLedgerError::connection)?;
        Ok(post_ids
            .iter()
            .filter_map(|post| {
                state
                    .votes
                    .get(&(*voter, *post))
                    .map(|value| (*post, *value))
            })
            .collect())
    }

    async fn ledger_total(&self, post: &PostId) -> Result<i64, VoteLedgerError> {
        let state = self.lock(VoteLedgerError::connection)?;
        Ok(state
            .votes
            .iter()
            .filter(|((_, voted), _)| voted == post)
            .map(|(_, value)| i64::from(value.as_i16()))
            .sum())
    }
}

#[async_trait]
impl TokenStore for InMemoryForum {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), TokenStoreError> {
        let mut state = self.lock(TokenStoreError::connection)?;
        state
            .tokens
            .insert(key.to_owned(), (value.to_owned(), Instant::now() + ttl));
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let mut state = self.lock(TokenStoreError::connection)?;
        Ok(state
            .tokens
            .remove(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value))
    }
}

/// Fast, reversible stand-in for Argon2; never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextHasher;

impl PlaintextHasher {
    const PREFIX: &'static str = "plain$";
}

#[async_trait]
impl PasswordHasher for PlaintextHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("{}{password}", Self::PREFIX))
    }

    async fn verify(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordHashError> {
        password_hash
            .strip_prefix(Self::PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::hashing("not a plaintext test hash"))
    }
}

/// Notifier that keeps every reset link it was asked to send.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    /// `(email, reset_link)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Token at the end of the most recent reset link.
    pub fn last_token(&self) -> Option<String> {
        self.sent()
            .last()
            .and_then(|(_, link)| link.rsplit('/').next().map(str::to_owned))
    }
}

#[async_trait]
impl PasswordResetNotifier for RecordingNotifier {
    async fn send_reset_link(
        &self,
        email: &str,
        reset_link: &str,
    ) -> Result<(), ResetNotificationError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| ResetNotificationError::delivery("recording lock poisoned"))?;
        sent.push((email.to_owned(), reset_link.to_owned()));
        Ok(())
    }
}
