//! Shared Diesel error mapping for repositories with basic query semantics.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Whether a Diesel failure means the store is unreachable or the statement
/// itself went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Unavailable(&'static str),
    Query(&'static str),
}

fn classify(error: &DieselError) -> Failure {
    match error {
        DieselError::NotFound => Failure::Query("record not found"),
        DieselError::QueryBuilderError(_) => Failure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            Failure::Unavailable("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            Failure::Unavailable("database busy, transaction aborted")
        }
        _ => Failure::Query("database error"),
    }
}

/// Map a Diesel failure onto a port's query or connection constructor.
///
/// Closed connections and aborted serializable transactions report the store
/// as unavailable; everything else is a query failure.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    } else {
        debug!(error = %error, "diesel operation failed");
    }

    match classify(&error) {
        Failure::Unavailable(message) => connection(message),
        Failure::Query(message) => query(message),
    }
}

/// Name of the foreign key constraint a write violated, if any.
pub fn violated_foreign_key(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            info.constraint_name()
        }
        _ => None,
    }
}
