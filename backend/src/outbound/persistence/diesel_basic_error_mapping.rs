//! Shared Diesel error mapping for the idea, user and vote repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Constraint failure reported by PostgreSQL, with the constraint name when
/// the server supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintViolation<'a> {
    Unique(Option<&'a str>),
    ForeignKey(Option<&'a str>),
}

/// Classify unique and foreign key violations.
pub(crate) fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation<'_>> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(ConstraintViolation::Unique(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            Some(ConstraintViolation::ForeignKey(info.constraint_name()))
        }
        _ => None,
    }
}

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Callers handle constraint violations they care about first; anything
/// left over lands here.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}


#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::test_support::database_error;
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    #[rstest]
    fn unique_violation_exposes_constraint_name() {
        let error = database_error(DatabaseErrorKind::UniqueViolation, Some("users_email_key"));
        assert_eq!(
            constraint_violation(&error),
            Some(ConstraintViolation::Unique(Some("users_email_key")))
        );
    }

    #[rstest]
    fn foreign_key_violation_is_classified() {
        let error = database_error(DatabaseErrorKind::ForeignKeyViolation, None);
        assert_eq!(
            constraint_violation(&error),
            Some(ConstraintViolation::ForeignKey(None))
        );
    }

    #[rstest]
    fn other_errors_are_not_constraint_violations() {
        assert_eq!(constraint_violation(&DieselError::NotFound), None);
    }

    #[rstest]
    fn closed_connection_maps_to_connection() {
        let error = database_error(DatabaseErrorKind::ClosedConnection, None);
        let mapped = map_basic_diesel_error(error, Mapped::Query, |message| {
            Mapped::Connection(message.to_owned())
        });
        assert_eq!(
            mapped,
            Mapped::Connection("database connection error".to_owned())
        );
    }

    #[rstest]
    fn other_database_errors_map_to_query() {
        let error = database_error(DatabaseErrorKind::CheckViolation, None);
        let mapped = map_basic_diesel_error(error, Mapped::Query, |message| {
            Mapped::Connection(message.to_owned())
        });
        assert_eq!(mapped, Mapped::Query("database error"));
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }
}
