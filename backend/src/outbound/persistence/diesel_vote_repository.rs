//! PostgreSQL-backed `VoteRepository` implementation using Diesel ORM.
//!
//! The `votes_user_idea_key` unique constraint enforces one vote per
//! (user, idea) pair even when two inserts race.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::{IdeaId, UserId, Vote, VoteId};

use super::diesel_basic_error_mapping::{
    constraint_violation, map_basic_diesel_error, map_basic_pool_error, ConstraintViolation,
};
use super::models::{NewVoteRow, VoteRow};
use super::pool::{DbPool, PoolError};
use super::schema::votes;
use super::schema_bootstrap::VOTES_USER_IDEA_KEY;

/// Diesel-backed implementation of the `VoteRepository` port.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselVoteRepository {
    /// Create a new repository with the given connection pool and clock.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> VoteRepositoryError {
    map_basic_pool_error(error, VoteRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> VoteRepositoryError {
    map_basic_diesel_error(
        error,
        VoteRepositoryError::query,
        VoteRepositoryError::connection,
    )
}

/// Map insert failures onto the vote-specific error variants.
fn map_insert_error(error: DieselError) -> VoteRepositoryError {
    match constraint_violation(&error) {
        Some(ConstraintViolation::Unique(Some(VOTES_USER_IDEA_KEY))) => {
            VoteRepositoryError::already_voted()
        }
        Some(ConstraintViolation::Unique(constraint)) => {
            warn!(?constraint, "unrecognised unique violation on votes");
            VoteRepositoryError::query("unique constraint violated")
        }
        Some(ConstraintViolation::ForeignKey(constraint)) => {
            let message = constraint.map_or_else(
                || "idea or user does not exist".to_owned(),
                |name| format!("violates {name}"),
            );
            VoteRepositoryError::missing_reference(message)
        }
        None => map_diesel_error(error),
    }
}

fn row_to_vote(row: VoteRow) -> Vote {
    Vote {
        id: VoteId::from_uuid(row.id),
        idea_id: IdeaId::from_uuid(row.idea_id),
        user_id: UserId::from_uuid(row.user_id),
        created_at: row.created_at,
    }
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn add(&self, user_id: &UserId, idea_id: &IdeaId) -> Result<Vote, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewVoteRow {
            id: Uuid::new_v4(),
            idea_id: *idea_id.as_uuid(),
            user_id: *user_id.as_uuid(),
            created_at: self.clock.utc(),
        };

        let row: VoteRow = diesel::insert_into(votes::table)
            .values(&new_row)
            .returning(VoteRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;

        debug!(vote_id = %row.id, "vote row inserted");
        Ok(row_to_vote(row))
    }

    async fn remove(&self, user_id: &UserId, idea_id: &IdeaId) -> Result<(), VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            votes::table
                .filter(votes::user_id.eq(user_id.as_uuid()))
                .filter(votes::idea_id.eq(idea_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(VoteRepositoryError::not_voted());
        }
        Ok(())
    }

    async fn has_voted(
        &self,
        user_id: &UserId,
        idea_id: &IdeaId,
    ) -> Result<bool, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            votes::table
                .filter(votes::user_id.eq(user_id.as_uuid()))
                .filter(votes::idea_id.eq(idea_id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn count(&self, idea_id: &IdeaId) -> Result<u64, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = votes::table
            .filter(votes::idea_id.eq(idea_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(total).unwrap_or_default())
    }
}
