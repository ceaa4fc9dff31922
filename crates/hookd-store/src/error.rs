use thiserror::Error;

/// Errors produced by the store layer.
///
/// The store never logs and never retries; every failure is returned to the
/// caller as one of these conditions.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error surfaced by the engine: connectivity, constraint or
    /// referential-integrity violations.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// JSON column encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transaction body failed and the rollback failed as well.
    /// The triggering error is kept as the source.
    #[error("Failed to roll back transaction ({rollback}): {source}")]
    Rollback {
        source: Box<StoreError>,
        rollback: rusqlite::Error,
    },

    /// Committing a transaction failed.
    #[error("Failed to commit transaction: {0}")]
    Commit(rusqlite::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
