//! PostgreSQL-backed `VoteLedger` implementation using Diesel ORM.
//!
//! A vote runs in one transaction: lock the post row with
//! `SELECT ... FOR UPDATE`, read the voter's existing row, plan the
//! transition, write the ledger row, and adjust `posts.points`. The row lock
//! serialises concurrent votes on the same post, so a duplicate submission
//! sees the first one's row and becomes a no-op. The `(user_id, post_id)`
//! primary key backs this up for writers that bypass the lock.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{VoteLedger, VoteLedgerError};
use crate::domain::{PostId, UserId, VoteTransition, VoteValue};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::VoteRow;
use super::pool::{DbPool, PoolError};
use super::schema::{posts, votes};

/// Diesel-backed implementation of the [`VoteLedger`] port.
#[derive(Clone)]
pub struct DieselVoteLedger {
    pool: DbPool,
}

impl DieselVoteLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failures inside the vote transaction.
///
/// Diesel requires the transaction's error type to absorb
/// `diesel::result::Error`; the extra variants carry domain outcomes out of
/// the closure while still rolling back.
#[derive(Debug)]
enum VoteTxError {
    Diesel(DieselError),
    PostNotFound,
    CorruptValue(i16),
}

impl From<DieselError> for VoteTxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

fn pool_error(error: PoolError) -> VoteLedgerError {
    map_pool_error(error, VoteLedgerError::connection)
}

fn diesel_error(error: &DieselError) -> VoteLedgerError {
    map_diesel_error(
        error,
        VoteLedgerError::query,
        VoteLedgerError::connection,
    )
}

fn stored_value(raw: i16) -> Result<VoteValue, VoteTxError> {
    VoteValue::try_from(raw).map_err(|_| VoteTxError::CorruptValue(raw))
}

async fn execute_vote(
    conn: &mut AsyncPgConnection,
    voter: Uuid,
    post: Uuid,
    value: VoteValue,
) -> Result<VoteTransition, VoteTxError> {
    let locked: Option<Uuid> = posts::table
        .find(post)
        .select(posts::id)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    if locked.is_none() {
        return Err(VoteTxError::PostNotFound);
    }

    let stored: Option<i16> = votes::table
        .find((voter, post))
        .select(votes::value)
        .first(conn)
        .await
        .optional()?;
    let existing = stored.map(stored_value).transpose()?;

    let transition = VoteTransition::plan(existing, value);
    match transition {
        VoteTransition::Unchanged(_) => return Ok(transition),
        VoteTransition::Insert(inserted) => {
            diesel::insert_into(votes::table)
                .values(VoteRow {
                    user_id: voter,
                    post_id: post,
                    value: inserted.as_i16(),
                })
                .execute(conn)
                .await?;
        }
        VoteTransition::Flip { to, .. } => {
            diesel::update(votes::table.find((voter, post)))
                .set(votes::value.eq(to.as_i16()))
                .execute(conn)
                .await?;
        }
    }

    diesel::update(posts::table.find(post))
        .set(posts::points.eq(posts::points + transition.points_delta()))
        .execute(conn)
        .await?;
    Ok(transition)
}

#[async_trait]
impl VoteLedger for DieselVoteLedger {
    async fn apply_vote(
        &self,
        voter: &UserId,
        post: &PostId,
        value: VoteValue,
    ) -> Result<VoteTransition, VoteLedgerError> {
        let mut pooled = self.pool.get().await.map_err(pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let voter_id = *voter.as_uuid();
        let post_id = *post.as_uuid();
        let result = conn
            .transaction::<_, VoteTxError, _>(|conn| {
                async move { execute_vote(conn, voter_id, post_id, value).await }.scope_boxed()
            })
            .await;

        result.map_err(|error| match error {
            VoteTxError::Diesel(err) => diesel_error(&err),
            VoteTxError::PostNotFound => VoteLedgerError::post_not_found(*post),
            VoteTxError::CorruptValue(raw) => {
                warn!(%post, %voter, raw, "vote row outside the ledger domain");
                VoteLedgerError::query(format!("stored vote value {raw} is invalid"))
            }
        })
    }

    async fn vote_statuses(
        &self,
        voter: &UserId,
        post_ids: &[PostId],
    ) -> Result<HashMap<PostId, VoteValue>, VoteLedgerError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<Uuid> = post_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<VoteRow> = votes::table
            .filter(votes::user_id.eq(*voter.as_uuid()))
            .filter(votes::post_id.eq_any(uuids))
            .select(VoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;

        let mut statuses = HashMap::with_capacity(rows.len());
        for row in rows {
            match VoteValue::try_from(row.value) {
                Ok(value) => {
                    statuses.insert(PostId::from_uuid(row.post_id), value);
                }
                Err(err) => warn!(post_id = %row.post_id, %err, "skipping corrupt vote row"),
            }
        }
        Ok(statuses)
    }

    async fn ledger_total(&self, post: &PostId) -> Result<i64, VoteLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: Option<i64> = votes::table
            .filter(votes::post_id.eq(*post.as_uuid()))
            .select(diesel::dsl::sum(votes::value))
            .first(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        Ok(total.unwrap_or(0))
    }
}
