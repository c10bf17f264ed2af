//! Idempotent creation of the users, ideas and votes tables.
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS` at startup. The DDL
//! runs inside one transaction guarded by an advisory lock, so several
//! processes starting against the same database do not race each other.

use diesel_async::SimpleAsyncConnection;
use tracing::{debug, info};

use super::pool::{DbPool, PoolError};

/// Unique constraint on `users.username`.
pub(crate) const USERS_USERNAME_KEY: &str = "users_username_key";
/// Unique constraint on `users.email`.
pub(crate) const USERS_EMAIL_KEY: &str = "users_email_key";
/// Unique constraint on `votes (user_id, idea_id)`.
pub(crate) const VOTES_USER_IDEA_KEY: &str = "votes_user_idea_key";

/// Arbitrary key serialising concurrent bootstraps.
const BOOTSTRAP_LOCK_KEY: i64 = 0x1DEA_B0A2D;

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password_hash TEXT NOT NULL,
    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT users_username_key UNIQUE (username),
    CONSTRAINT users_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS ideas (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    tech_stack TEXT[] NOT NULL DEFAULT '{}',
    tags TEXT[] NOT NULL DEFAULT '{}',
    status VARCHAR(20) NOT NULL DEFAULT 'requested',
    requested_by VARCHAR(100) NOT NULL DEFAULT 'anonymous',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS votes (
    id UUID PRIMARY KEY,
    idea_id UUID NOT NULL REFERENCES ideas (id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT votes_user_idea_key UNIQUE (user_id, idea_id)
);

CREATE INDEX IF NOT EXISTS votes_idea_id_idx ON votes (idea_id);
";

/// Failures while creating the schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No connection could be checked out.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// PostgreSQL rejected the DDL.
    #[error("failed to create schema: {0}")]
    Apply(#[from] diesel::result::Error),
}

fn bootstrap_script() -> String {
    format!("BEGIN;\nSELECT pg_advisory_xact_lock({BOOTSTRAP_LOCK_KEY});\n{SCHEMA_SQL}\nCOMMIT;")
}

/// Create any missing tables, constraints and indexes.
///
/// Safe to call on every startup.
///
/// # Errors
///
/// Returns [`SchemaError::Pool`] when no connection is available and
/// [`SchemaError::Apply`] when a statement fails.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), SchemaError> {
    let mut conn = pool.get().await?;
    debug!("applying idea board schema");
    conn.batch_execute(&bootstrap_script()).await?;
    info!("database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(USERS_USERNAME_KEY)]
    #[case(USERS_EMAIL_KEY)]
    #[case(VOTES_USER_IDEA_KEY)]
    fn constraint_names_match_the_ddl(#[case] name: &str) {
        assert!(SCHEMA_SQL.contains(&format!("CONSTRAINT {name} UNIQUE")));
    }

    #[rstest]
    fn every_table_is_created_idempotently() {
        for table in ["users", "ideas", "votes"] {
            assert!(SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")));
        }
    }

    #[rstest]
    fn votes_cascade_from_both_parents() {
        assert_eq!(SCHEMA_SQL.matches("ON DELETE CASCADE").count(), 2);
    }

    #[rstest]
    fn script_runs_in_a_locked_transaction() {
        let script = bootstrap_script();
        assert!(script.starts_with("BEGIN;"));
        assert!(script.contains("pg_advisory_xact_lock"));
        assert!(script.trim_end().ends_with("COMMIT;"));
    }
}
