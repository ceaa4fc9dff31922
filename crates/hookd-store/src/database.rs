//! Database connection management and the transactional scope.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees
//! that migrations are run before any other operation. Entity operations
//! live on [`Store`], a borrowed view over a connection, so the same code
//! serves both the plain handle and the scope handed out by
//! [`Database::in_transaction`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at an explicit path.
    ///
    /// Applies the recommended pragmas and runs any pending schema
    /// migrations before returning the handle.
    pub fn open_at(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;

        // Recommended SQLite settings. Referential integrity between
        // endpoints/messages and subscribers depends on foreign_keys=ON.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // Run schema migrations.
        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Borrow a [`Store`] view over the live connection.
    pub fn store(&self) -> Store<'_> {
        Store { conn: &self.conn }
    }

    /// Run `work` inside a single flat transaction.
    ///
    /// The closure receives a [`Store`] bound to the transaction; writes
    /// made through it are invisible outside the scope until commit. An
    /// error from `work` rolls the scope back and propagates unchanged,
    /// except that a rollback failure wraps it rather than replacing it.
    /// On success the scope is committed and a commit failure is
    /// propagated. Nested scopes are not supported.
    pub fn in_transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&Store<'_>) -> Result<T>,
    {
        let tx = self.conn.transaction()?;
        match work(&Store { conn: &tx }) {
            Ok(value) => match tx.commit() {
                Ok(()) => Ok(value),
                Err(err) => Err(StoreError::Commit(err)),
            },
            Err(err) => match tx.rollback() {
                Ok(()) => Err(err),
                Err(rollback) => Err(StoreError::Rollback {
                    source: Box::new(err),
                    rollback,
                }),
            },
        }
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

/// Borrowed view over a connection carrying the typed entity operations.
///
/// Obtained from [`Database::store`] for the live connection, or handed to
/// the closure of [`Database::in_transaction`] for a transactional scope.
pub struct Store<'c> {
    conn: &'c Connection,
}

impl Store<'_> {
    pub(crate) fn conn(&self) -> &Connection {
        self.conn
    }
}

// ---------------------------------------------------------------------------
// Row decoding helpers
// ---------------------------------------------------------------------------

pub(crate) fn column_uuid(value: &str, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn column_timestamp(value: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn column_json<T: serde::de::DeserializeOwned>(
    value: &str,
    idx: usize,
) -> rusqlite::Result<T> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
pub(crate) fn open_test_database() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::open_at(&dir.path().join("hookd.db")).expect("should open");
    (dir, db)
}
