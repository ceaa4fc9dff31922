//! Operations for [`Message`] records.
//!
//! Messages are write-once facts: save, get and delete only. There is no
//! update and no list surface in this layer.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{column_json, column_timestamp, column_uuid, Store};
use crate::error::{Result, StoreError};
use crate::models::Message;

impl Store<'_> {
    /// Insert a new message, assigning its id and creation timestamp.
    ///
    /// Tags are stored verbatim; duplicates submitted by the caller are
    /// preserved.
    pub fn save_message(&self, message: &mut Message) -> Result<()> {
        message.id = Uuid::new_v4();
        message.created_at = Utc::now();

        self.conn().execute(
            "INSERT INTO messages (id, type, data, tags, subscriber_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id.to_string(),
                message.event_type,
                serde_json::to_string(&message.data)?,
                serde_json::to_string(&message.tags)?,
                message.subscriber_id.to_string(),
                message.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a single message by id.
    pub fn get_message(&self, id: Uuid) -> Result<Message> {
        self.conn()
            .query_row(
                "SELECT id, type, data, tags, subscriber_id, created_at
                 FROM messages
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Delete a message by id. Returns `true` if a row was deleted;
    /// deleting an unknown id is not an error.
    pub fn delete_message(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM messages WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to a [`Message`].
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let event_type: String = row.get(1)?;
    let data_str: String = row.get(2)?;
    let tags_str: String = row.get(3)?;
    let subscriber_id_str: String = row.get(4)?;
    let created_str: String = row.get(5)?;

    Ok(Message {
        id: column_uuid(&id_str, 0)?,
        event_type,
        data: column_json(&data_str, 2)?,
        tags: column_json(&tags_str, 3)?,
        subscriber_id: column_uuid(&subscriber_id_str, 4)?,
        created_at: column_timestamp(&created_str, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_test_database;
    use crate::models::Subscriber;

    #[test]
    fn message_lifecycle() {
        let (_dir, db) = open_test_database();
        let store = db.store();

        let mut sub = Subscriber::new("test");
        store.save_subscriber(&mut sub).expect("save subscriber");

        let mut msg = Message::new("test", serde_json::json!({"key": "value"}), sub.id);
        msg.tags = vec!["tag1".to_string(), "tag2".to_string()];
        store.save_message(&mut msg).expect("save");
        assert!(!msg.id.is_nil());
        assert!(msg.created_at > chrono::DateTime::UNIX_EPOCH);

        let read = store.get_message(msg.id).expect("get");
        assert_eq!(msg, read);

        assert!(store.delete_message(msg.id).expect("delete"));
        assert!(matches!(
            store.get_message(msg.id),
            Err(StoreError::NotFound)
        ));
        assert!(!store.delete_message(msg.id).expect("re-delete"));
    }

    #[test]
    fn save_message_preserves_duplicate_tags() {
        let (_dir, db) = open_test_database();
        let store = db.store();

        let mut sub = Subscriber::new("test");
        store.save_subscriber(&mut sub).expect("save subscriber");

        let mut msg = Message::new("test.created", serde_json::json!({"n": 1}), sub.id);
        msg.tags = vec!["tag1".to_string(), "tag1".to_string(), "tag2".to_string()];
        store.save_message(&mut msg).expect("save");

        let read = store.get_message(msg.id).expect("get");
        assert_eq!(
            read.tags,
            vec!["tag1".to_string(), "tag1".to_string(), "tag2".to_string()]
        );
    }

    #[test]
    fn save_message_without_tags() {
        let (_dir, db) = open_test_database();
        let store = db.store();

        let mut sub = Subscriber::new("test");
        store.save_subscriber(&mut sub).expect("save subscriber");

        let mut msg = Message::new("test-1", serde_json::json!({"key": "value"}), sub.id);
        store.save_message(&mut msg).expect("save");

        let read = store.get_message(msg.id).expect("get");
        assert!(read.tags.is_empty());
        assert_eq!(msg, read);
    }

    #[test]
    fn get_message_not_found() {
        let (_dir, db) = open_test_database();

        assert!(matches!(
            db.store().get_message(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }
}
