//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Duplicate usernames and emails are probed before inserting so callers get
//! a precise error. The unique constraints still decide when two sign-ups
//! race; their violations map to the same errors.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{HashedPassword, NewUser, User, UserId};

use super::diesel_basic_error_mapping::{
    constraint_violation, map_basic_diesel_error, map_basic_pool_error, ConstraintViolation,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::schema_bootstrap::{USERS_EMAIL_KEY, USERS_USERNAME_KEY};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool and clock.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Map insert failures, turning unique violations into duplicate errors.
fn map_insert_error(error: DieselError, user: &NewUser) -> UserRepositoryError {
    match constraint_violation(&error) {
        Some(ConstraintViolation::Unique(Some(USERS_USERNAME_KEY))) => {
            UserRepositoryError::duplicate_username(user.username.clone())
        }
        Some(ConstraintViolation::Unique(Some(USERS_EMAIL_KEY))) => {
            UserRepositoryError::duplicate_email(user.email.clone())
        }
        Some(ConstraintViolation::Unique(constraint)) => {
            warn!(?constraint, "unrecognised unique violation on users");
            UserRepositoryError::query("unique constraint violated")
        }
        _ => map_diesel_error(error),
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::from_uuid(row.id),
        username: row.username,
        email: row.email,
        password_hash: HashedPassword::from_phc(row.password_hash),
        is_admin: row.is_admin,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let username_taken: bool = diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(&user.username)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if username_taken {
            return Err(UserRepositoryError::duplicate_username(user.username));
        }

        let email_taken: bool = diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(&user.email)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if email_taken {
            return Err(UserRepositoryError::duplicate_email(user.email));
        }

        let now = self.clock.utc();
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            username: &user.username,
            email: &user.email,
            password_hash: user.password_hash.as_str(),
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, &user))?;

        debug!(user_id = %row.id, "user row inserted");
        Ok(row_to_user(row))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn delete_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> =
            diesel::delete(users::table.filter(users::username.eq(username)))
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for constraint mapping; queries are covered by the
    //! embedded PostgreSQL suite.
    use super::*;
    use diesel::result::DatabaseErrorKind;
    use rstest::{fixture, rstest};

    use super::super::diesel_basic_error_mapping::test_support::database_error;

    #[fixture]
    fn new_user() -> NewUser {
        NewUser {
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: HashedPassword::from_phc("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA"),
            is_admin: false,
        }
    }

    #[rstest]
    fn username_constraint_maps_to_duplicate_username(new_user: NewUser) {
        let err = map_insert_error(
            database_error(DatabaseErrorKind::UniqueViolation, Some(USERS_USERNAME_KEY)),
            &new_user,
        );
        assert_eq!(err, UserRepositoryError::duplicate_username("ada"));
    }

    #[rstest]
    fn email_constraint_maps_to_duplicate_email(new_user: NewUser) {
        let err = map_insert_error(
            database_error(DatabaseErrorKind::UniqueViolation, Some(USERS_EMAIL_KEY)),
            &new_user,
        );
        assert_eq!(err, UserRepositoryError::duplicate_email("ada@example.com"));
    }

    #[rstest]
    fn unnamed_unique_violation_is_a_query_error(new_user: NewUser) {
        let err = map_insert_error(
            database_error(DatabaseErrorKind::UniqueViolation, None),
            &new_user,
        );
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_is_a_connection_error(new_user: NewUser) {
        let err = map_insert_error(
            database_error(DatabaseErrorKind::ClosedConnection, None),
            &new_user,
        );
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn rows_keep_the_stored_hash() {
        let now = chrono::Utc::now();
        let user = row_to_user(UserRow {
            id: Uuid::new_v4(),
            username: "grace".to_owned(),
            email: "grace@example.com".to_owned(),
            password_hash: "$argon2id$stored".to_owned(),
            is_admin: true,
            created_at: now,
            updated_at: now,
        });

        assert_eq!(user.password_hash.as_str(), "$argon2id$stored");
        assert!(user.is_admin);
    }
}
