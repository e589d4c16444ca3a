//! sqlx error inspection shared by the repositories

use tracing::error;

use backoffice_core::error::{DomainError, ErrorCode};

/// Name of the violated constraint, if the database reported one.
pub(crate) fn constraint(e: &sqlx::Error) -> Option<&str> {
    e.as_database_error().and_then(|db| db.constraint())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_foreign_key_violation())
}

/// Logs the raw cause and wraps it as an internal error under `code`.
pub(crate) fn storage(code: ErrorCode, context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::storage(code, e)
}
