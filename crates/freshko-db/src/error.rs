//! # Storage Error Types
//!
//! Error types for the storage tiers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds context and categorization           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Storage facade ← RECOVERS: logs and redoes the op on the flat tier     │
//! │                                                                         │
//! │  Storage errors never reach domain-store callers. The worst case is     │
//! │  degraded persistence on the flat tier.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Storage tier errors.
///
/// These wrap sqlx errors and provide categorization for the facade's
/// fallback decision and for logs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The engine could not be opened or is no longer reachable.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, disk full)
    /// - Connection pool closed or exhausted
    #[error("Storage engine unavailable: {0}")]
    Unavailable(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value was not valid JSON / not the expected shape.
    ///
    /// The facade treats this as "key absent", never as a crash.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Legacy migration failed as a whole (individual key failures are
    /// logged and counted, not raised).
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Convert sqlx errors to StorageError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut    → Unavailable
/// sqlx::Error::PoolClosed      → Unavailable
/// sqlx::Error::Database        → QueryFailed (message preserved)
/// Other                        → QueryFailed
/// ```
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                StorageError::Unavailable("connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => StorageError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Database(db_err) => StorageError::QueryFailed(db_err.message().to_string()),
            other => StorageError::QueryFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
