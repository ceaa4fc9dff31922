//! CRUD operations for [`Subscriber`] records.

use chrono::Utc;
use rusqlite::params;
use serde_json::Value;
use uuid::Uuid;

use crate::database::{column_json, column_timestamp, column_uuid, Store};
use crate::error::{Result, StoreError};
use crate::models::Subscriber;

impl Store<'_> {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new subscriber, assigning its id and timestamps.
    ///
    /// Absent (`Null`) metadata is normalized to an empty object before
    /// the write so reads always yield a valid document.
    pub fn save_subscriber(&self, subscriber: &mut Subscriber) -> Result<()> {
        if subscriber.metadata.is_null() {
            subscriber.metadata = Value::Object(serde_json::Map::new());
        }
        subscriber.id = Uuid::new_v4();
        subscriber.created_at = Utc::now();
        subscriber.updated_at = subscriber.created_at;

        self.conn().execute(
            "INSERT INTO subscribers (id, name, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                subscriber.id.to_string(),
                subscriber.name,
                serde_json::to_string(&subscriber.metadata)?,
                subscriber.created_at.to_rfc3339(),
                subscriber.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single subscriber by id.
    pub fn get_subscriber(&self, id: Uuid) -> Result<Subscriber> {
        self.conn()
            .query_row(
                "SELECT id, name, metadata, created_at, updated_at
                 FROM subscribers
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_subscriber,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace the mutable fields (name, metadata) and refresh
    /// `updated_at`. Returns [`StoreError::NotFound`] when the id no
    /// longer exists.
    pub fn update_subscriber(&self, subscriber: &mut Subscriber) -> Result<()> {
        subscriber.updated_at = Utc::now();

        let affected = self.conn().execute(
            "UPDATE subscribers SET
                name = ?2,
                metadata = ?3,
                updated_at = ?4
             WHERE id = ?1",
            params![
                subscriber.id.to_string(),
                subscriber.name,
                serde_json::to_string(&subscriber.metadata)?,
                subscriber.updated_at.to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a subscriber by id. Returns `true` if a row was deleted;
    /// deleting an unknown id is not an error. Child endpoints and
    /// messages go with it (ON DELETE CASCADE).
    pub fn delete_subscriber(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM subscribers WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Subscriber`].
fn row_to_subscriber(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subscriber> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let metadata_str: String = row.get(2)?;
    let created_str: String = row.get(3)?;
    let updated_str: String = row.get(4)?;

    Ok(Subscriber {
        id: column_uuid(&id_str, 0)?,
        name,
        metadata: column_json(&metadata_str, 2)?,
        created_at: column_timestamp(&created_str, 3)?,
        updated_at: column_timestamp(&updated_str, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_test_database;
    use crate::models::{Endpoint, Message};

    #[test]
    fn subscriber_lifecycle() {
        let (_dir, db) = open_test_database();
        let store = db.store();

        let mut sub = Subscriber::new("test");
        store.save_subscriber(&mut sub).expect("save");
        assert!(!sub.id.is_nil());
        assert!(sub.created_at > chrono::DateTime::UNIX_EPOCH);

        let read = store.get_subscriber(sub.id).expect("get");
        assert_eq!(sub, read);

        sub.name = "test-updated".to_string();
        sub.metadata = serde_json::json!({"plan": "pro"});
        store.update_subscriber(&mut sub).expect("update");
        assert!(sub.updated_at >= sub.created_at);

        let read = store.get_subscriber(sub.id).expect("get after update");
        assert_eq!(sub, read);

        assert!(store.delete_subscriber(sub.id).expect("delete"));
        assert!(matches!(
            store.get_subscriber(sub.id),
            Err(StoreError::NotFound)
        ));

        // Deleting again is a no-op, not an error.
        assert!(!store.delete_subscriber(sub.id).expect("re-delete"));
    }

    #[test]
    fn save_normalizes_missing_metadata() {
        let (_dir, db) = open_test_database();
        let store = db.store();

        let mut sub = Subscriber::new("no-metadata");
        assert!(sub.metadata.is_null());
        store.save_subscriber(&mut sub).expect("save");
        assert_eq!(sub.metadata, serde_json::json!({}));

        let read = store.get_subscriber(sub.id).expect("get");
        assert_eq!(read.metadata, serde_json::json!({}));
    }

    #[test]
    fn delete_subscriber_cascades_to_children() {
        let (_dir, db) = open_test_database();
        let store = db.store();

        let mut sub = Subscriber::new("cascade");
        store.save_subscriber(&mut sub).expect("save subscriber");

        let mut endpoint = Endpoint::new("e1", "http://x.com", "whsec_cascade", sub.id);
        store.save_endpoint(&mut endpoint).expect("save endpoint");

        let mut msg = Message::new("test", serde_json::json!({}), sub.id);
        store.save_message(&mut msg).expect("save message");

        assert!(store.delete_subscriber(sub.id).expect("delete"));
        assert!(matches!(
            store.get_endpoint(endpoint.id),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.get_message(msg.id),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn get_subscriber_not_found() {
        let (_dir, db) = open_test_database();

        assert!(matches!(
            db.store().get_subscriber(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn update_subscriber_missing_row_is_not_found() {
        let (_dir, db) = open_test_database();

        let mut sub = Subscriber::new("ghost");
        sub.id = Uuid::new_v4();
        assert!(matches!(
            db.store().update_subscriber(&mut sub),
            Err(StoreError::NotFound)
        ));
    }
}
