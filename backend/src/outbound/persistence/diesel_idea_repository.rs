//! PostgreSQL-backed `IdeaRepository` implementation using Diesel ORM.
//!
//! Vote counts are not stored on the idea row. Every read joins them in from
//! the `votes` table with a grouped count.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{IdeaRepository, IdeaRepositoryError};
use crate::domain::{Idea, IdeaFields, IdeaId, TechStack};
use crate::outbound::stored_idea::{status_from_stored, tech_stack_from_stored};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{IdeaRow, IdeaUpdate, NewIdeaRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ideas, votes};

/// Diesel-backed implementation of the `IdeaRepository` port.
#[derive(Clone)]
pub struct DieselIdeaRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselIdeaRepository {
    /// Create a new repository with the given connection pool and clock.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> IdeaRepositoryError {
    map_basic_pool_error(error, IdeaRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> IdeaRepositoryError {
    map_basic_diesel_error(
        error,
        IdeaRepositoryError::query,
        IdeaRepositoryError::connection,
    )
}

fn tech_stack_names(stack: &[TechStack]) -> Vec<&'static str> {
    stack.iter().map(TechStack::as_str).collect()
}

fn vote_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

/// Convert a database row to a domain idea.
fn row_to_idea(row: IdeaRow, votes: i64) -> Idea {
    let tech_stack = tech_stack_from_stored(row.id, &row.tech_stack);
    let status = status_from_stored(row.id, &row.status);

    Idea {
        id: IdeaId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        tech_stack,
        tags: row.tags,
        status,
        vote_count: vote_count(votes),
        requested_by: row.requested_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

async fn count_votes(conn: &mut AsyncPgConnection, idea_id: Uuid) -> Result<i64, DieselError> {
    votes::table
        .filter(votes::idea_id.eq(idea_id))
        .count()
        .get_result(conn)
        .await
}

async fn count_votes_for(
    conn: &mut AsyncPgConnection,
    idea_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, DieselError> {
    if idea_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let counts: Vec<(Uuid, i64)> = votes::table
        .filter(votes::idea_id.eq_any(idea_ids))
        .group_by(votes::idea_id)
        .select((votes::idea_id, diesel::dsl::count(votes::id)))
        .load(conn)
        .await?;
    Ok(counts.into_iter().collect())
}

#[async_trait]
impl IdeaRepository for DieselIdeaRepository {
    async fn list(&self) -> Result<Vec<Idea>, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<IdeaRow> = ideas::table
            .order((ideas::created_at.asc(), ideas::id.asc()))
            .select(IdeaRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let counts = count_votes_for(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let votes = counts.get(&row.id).copied().unwrap_or_default();
                row_to_idea(row, votes)
            })
            .collect())
    }

    async fn find_by_id(&self, id: &IdeaId) -> Result<Option<Idea>, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<IdeaRow> = ideas::table
            .find(id.as_uuid())
            .select(IdeaRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let votes = count_votes(&mut conn, row.id)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(row_to_idea(row, votes)))
    }

    async fn create(&self, fields: IdeaFields) -> Result<Idea, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = self.clock.utc();

        let new_row = NewIdeaRow {
            id: Uuid::new_v4(),
            title: &fields.title,
            description: &fields.description,
            tech_stack: tech_stack_names(&fields.tech_stack),
            tags: &fields.tags,
            status: fields.status.as_str(),
            requested_by: &fields.requested_by,
            created_at: now,
            updated_at: now,
        };

        let row: IdeaRow = diesel::insert_into(ideas::table)
            .values(&new_row)
            .returning(IdeaRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(idea_id = %row.id, "idea row inserted");
        Ok(row_to_idea(row, 0))
    }

    async fn update(&self, id: &IdeaId, fields: IdeaFields) -> Result<Idea, IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = IdeaUpdate {
            title: &fields.title,
            description: &fields.description,
            tech_stack: tech_stack_names(&fields.tech_stack),
            tags: &fields.tags,
            status: fields.status.as_str(),
            requested_by: &fields.requested_by,
            updated_at: self.clock.utc(),
        };

        let row: Option<IdeaRow> = diesel::update(ideas::table.find(id.as_uuid()))
            .set(&changes)
            .returning(IdeaRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let row = row.ok_or_else(|| IdeaRepositoryError::not_found(*id))?;
        let votes = count_votes(&mut conn, row.id)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_idea(row, votes))
    }

    async fn delete(&self, id: &IdeaId) -> Result<(), IdeaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(ideas::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(IdeaRepositoryError::not_found(*id));
        }
        Ok(())
    }
}
