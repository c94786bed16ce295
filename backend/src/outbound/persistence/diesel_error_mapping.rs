//! Shared Diesel error mapping for the forum repositories.
//!
//! Each repository owns its port error type; these helpers take the port's
//! constructors so the Diesel-to-port translation lives in one place.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::UniqueUserField;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map common Diesel error variants into query/connection constructors.
pub(crate) fn map_diesel_error<E, Q, C>(error: &DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    log_diesel_error(error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("transaction serialisation failure")
        }
        _ => query("database error"),
    }
}

/// Identify which user column a unique violation collided with.
///
/// Prefers the constraint name and falls back to the server message for
/// drivers that omit it.
pub(crate) fn unique_user_field(
    info: &(dyn DatabaseErrorInformation + Send + Sync),
) -> Option<UniqueUserField> {
    let constraint = info.constraint_name().unwrap_or_default();
    let message = info.message();
    if constraint.contains("username") || message.contains("users_username_key") {
        Some(UniqueUserField::Username)
    } else if constraint.contains("email") || message.contains("users_email_key") {
        Some(UniqueUserField::Email)
    } else {
        None
    }
}
