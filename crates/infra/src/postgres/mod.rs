//! Postgres-backed stores.
//!
//! ## Error mapping
//!
//! | sqlx error | SQLSTATE | Mapped to |
//! |------------|----------|-----------|
//! | Database (unique violation) | `23505` | `Integrity` (alerts), `AlreadyExists` (items) |
//! | Database (check violation) | `23514` | `Domain` validation (items) |
//! | Database (other), pool closed, I/O | any | `Storage` |

mod items;
mod notifications;

pub use items::PostgresItemRepository;
pub use notifications::PostgresNotificationStore;

const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

/// SQLSTATE of a database error, if any.
fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Render a sqlx error as a storage message tagged with the operation.
fn describe(operation: &str, err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {operation}: {}", db_err.message())
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        other => format!("sqlx error in {operation}: {other}"),
    }
}
