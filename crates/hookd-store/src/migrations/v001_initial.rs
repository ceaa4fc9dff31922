//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `subscribers`, `endpoints` and
//! `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Subscribers
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS subscribers (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name       TEXT NOT NULL,
    metadata   TEXT NOT NULL,               -- opaque JSON document
    created_at TEXT NOT NULL,               -- ISO-8601 / RFC-3339
    updated_at TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Endpoints
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS endpoints (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    label         TEXT NOT NULL,
    url           TEXT NOT NULL,
    secret        TEXT NOT NULL,              -- whsec_ bearer token
    disabled      INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    filter_types  TEXT NOT NULL,              -- JSON array of event types
    subscriber_id TEXT NOT NULL,              -- FK -> subscribers(id)
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,

    FOREIGN KEY (subscriber_id) REFERENCES subscribers(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_endpoints_subscriber_id ON endpoints(subscriber_id);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    type          TEXT NOT NULL,              -- event type
    data          TEXT NOT NULL,              -- opaque JSON payload
    tags          TEXT NOT NULL,              -- JSON array, duplicates kept
    subscriber_id TEXT NOT NULL,              -- FK -> subscribers(id)
    created_at    TEXT NOT NULL,

    FOREIGN KEY (subscriber_id) REFERENCES subscribers(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_subscriber_id ON messages(subscriber_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
