//! CRUD and list/filter operations for [`Endpoint`] records.

use std::collections::HashSet;
use std::hash::Hash;

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{column_json, column_timestamp, column_uuid, Store};
use crate::error::{Result, StoreError};
use crate::models::Endpoint;

/// Drain a sequence into a set and back, dropping duplicate elements.
/// No ordering is preserved.
fn remove_duplicates<T: Eq + Hash>(values: &mut Vec<T>) {
    let unique: HashSet<T> = values.drain(..).collect();
    values.extend(unique);
}

/// Filters accepted by [`Store::list_endpoints`].
#[derive(Debug, Clone, Default)]
pub struct ListEndpointsParams {
    pub subscriber_id: Uuid,
    /// `None` matches enabled and disabled endpoints alike.
    pub disabled: Option<bool>,
    /// When set, matches endpoints whose filter set is empty or contains
    /// this exact event type.
    pub filter_type: Option<String>,
}

impl Store<'_> {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new endpoint, assigning its id and timestamps.
    ///
    /// `filter_types` is deduplicated in place before the write. A
    /// `subscriber_id` that references no existing subscriber is rejected
    /// by the engine's foreign-key check.
    pub fn save_endpoint(&self, endpoint: &mut Endpoint) -> Result<()> {
        remove_duplicates(&mut endpoint.filter_types);
        endpoint.id = Uuid::new_v4();
        endpoint.created_at = Utc::now();
        endpoint.updated_at = endpoint.created_at;

        self.conn().execute(
            "INSERT INTO endpoints
                (id, label, url, secret, disabled, filter_types, subscriber_id,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                endpoint.id.to_string(),
                endpoint.label,
                endpoint.url,
                endpoint.secret,
                endpoint.disabled,
                serde_json::to_string(&endpoint.filter_types)?,
                endpoint.subscriber_id.to_string(),
                endpoint.created_at.to_rfc3339(),
                endpoint.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single endpoint by id.
    pub fn get_endpoint(&self, id: Uuid) -> Result<Endpoint> {
        self.conn()
            .query_row(
                "SELECT id, label, url, secret, disabled, filter_types,
                        subscriber_id, created_at, updated_at
                 FROM endpoints
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_endpoint,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List endpoints for a subscriber, optionally restricted by disabled
    /// state and by a single event type.
    ///
    /// An endpoint with an empty filter set receives all types, so it
    /// matches any requested `filter_type`. Result order is unspecified.
    pub fn list_endpoints(&self, params: ListEndpointsParams) -> Result<Vec<Endpoint>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, label, url, secret, disabled, filter_types,
                    subscriber_id, created_at, updated_at
             FROM endpoints
             WHERE subscriber_id = ?1",
        )?;
        let rows = stmt.query_map(
            [params.subscriber_id.to_string()],
            row_to_endpoint,
        )?;

        let mut endpoints = Vec::new();
        for row in rows {
            endpoints.push(row?);
        }

        endpoints.retain(|endpoint| {
            let state_matches = params
                .disabled
                .map_or(true, |disabled| endpoint.disabled == disabled);
            let type_matches = params.filter_type.as_ref().map_or(true, |filter_type| {
                endpoint.filter_types.is_empty() || endpoint.filter_types.contains(filter_type)
            });
            state_matches && type_matches
        });

        Ok(endpoints)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace the mutable fields (label, url, disabled, filter_types,
    /// secret) and refresh `updated_at`. `filter_types` is deduplicated in
    /// place again. Returns [`StoreError::NotFound`] when the id no longer
    /// exists.
    pub fn update_endpoint(&self, endpoint: &mut Endpoint) -> Result<()> {
        remove_duplicates(&mut endpoint.filter_types);
        endpoint.updated_at = Utc::now();

        let affected = self.conn().execute(
            "UPDATE endpoints SET
                label = ?2,
                url = ?3,
                disabled = ?4,
                filter_types = ?5,
                secret = ?6,
                updated_at = ?7
             WHERE id = ?1",
            params![
                endpoint.id.to_string(),
                endpoint.label,
                endpoint.url,
                endpoint.disabled,
                serde_json::to_string(&endpoint.filter_types)?,
                endpoint.secret,
                endpoint.updated_at.to_rfc3339(),
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

    /// Delete an endpoint by id. Returns `true` if a row was deleted;
    /// deleting an unknown id is not an error.
    pub fn delete_endpoint(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM endpoints WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to an [`Endpoint`].
fn row_to_endpoint(row: &rusqlite::Row<'_>) -> rusqlite::Result<Endpoint> {
    let id_str: String = row.get(0)?;
    let label: String = row.get(1)?;
    let url: String = row.get(2)?;
    let secret: String = row.get(3)?;
    let disabled: bool = row.get(4)?;
    let filter_types_str: String = row.get(5)?;
    let subscriber_id_str: String = row.get(6)?;
    let created_str: String = row.get(7)?;
    let updated_str: String = row.get(8)?;

    Ok(Endpoint {
        id: column_uuid(&id_str, 0)?,
        label,
        url,
        secret,
        disabled,
        filter_types: column_json(&filter_types_str, 5)?,
        subscriber_id: column_uuid(&subscriber_id_str, 6)?,
        created_at: column_timestamp(&created_str, 7)?,
        updated_at: column_timestamp(&updated_str, 8)?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::database::open_test_database;
    use crate::models::Subscriber;

    fn saved_subscriber(store: &Store<'_>) -> Subscriber {
        let mut sub = Subscriber::new("test");
        store.save_subscriber(&mut sub).expect("save subscriber");
        sub
    }

    fn labels(endpoints: &[Endpoint]) -> HashSet<String> {
        endpoints.iter().map(|e| e.label.clone()).collect()
    }

    #[test]
    fn endpoint_lifecycle() {
        let (_dir, db) = open_test_database();
        let store = db.store();
        let sub = saved_subscriber(&store);

        let mut endpoint = Endpoint::new(
            "test-endpoint",
            "http://endpoint.com",
            "whsec_lifecycle",
            sub.id,
        );
        endpoint.filter_types = vec![
            "foo.bar".to_string(),
            "foo.bar".to_string(),
            "foo.baz".to_string(),
        ];

        store.save_endpoint(&mut endpoint).expect("save");
        assert!(!endpoint.id.is_nil());
        assert_eq!(
            endpoint.filter_types.len(),
            2,
            "duplicate filter type should be removed on save"
        );
        assert_eq!(
            endpoint.filter_types.iter().cloned().collect::<HashSet<_>>(),
            HashSet::from(["foo.bar".to_string(), "foo.baz".to_string()])
        );

        let read = store.get_endpoint(endpoint.id).expect("get");
        assert_eq!(endpoint, read);

        endpoint.disabled = true;
        endpoint.filter_types = vec!["test.created".to_string(), "test.created".to_string()];
        store.update_endpoint(&mut endpoint).expect("update");
        assert_eq!(
            endpoint.filter_types,
            vec!["test.created".to_string()],
            "duplicate filter type should be removed on update"
        );

        let read = store.get_endpoint(endpoint.id).expect("get after update");
        assert_eq!(endpoint, read);

        assert!(store.delete_endpoint(endpoint.id).expect("delete"));
        assert!(matches!(
            store.get_endpoint(endpoint.id),
            Err(StoreError::NotFound)
        ));
        assert!(!store.delete_endpoint(endpoint.id).expect("re-delete"));
    }

    #[test]
    fn save_endpoint_requires_existing_subscriber() {
        let (_dir, db) = open_test_database();

        let mut endpoint =
            Endpoint::new("orphan", "http://orphan.com", "whsec_orphan", Uuid::new_v4());
        let err = db
            .store()
            .save_endpoint(&mut endpoint)
            .expect_err("insert with unknown subscriber should fail");
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn get_endpoint_not_found() {
        let (_dir, db) = open_test_database();

        assert!(matches!(
            db.store().get_endpoint(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn update_endpoint_missing_row_is_not_found() {
        let (_dir, db) = open_test_database();
        let store = db.store();
        let sub = saved_subscriber(&store);

        let mut endpoint = Endpoint::new("ghost", "http://ghost.com", "whsec_ghost", sub.id);
        endpoint.id = Uuid::new_v4();
        assert!(matches!(
            store.update_endpoint(&mut endpoint),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn list_endpoints_filtering() {
        let (_dir, db) = open_test_database();
        let store = db.store();
        let sub = saved_subscriber(&store);

        let mut restricted = Endpoint::new("test-1", "http://test-1.com", "whsec_1", sub.id);
        restricted.filter_types = vec!["test.created".to_string(), "test.updated".to_string()];
        store.save_endpoint(&mut restricted).expect("save");

        let mut unrestricted = Endpoint::new("test-2", "http://test-2.com", "whsec_2", sub.id);
        store.save_endpoint(&mut unrestricted).expect("save");

        let mut disabled = Endpoint::new("test-3", "http://test-3.com", "whsec_3", sub.id);
        disabled.disabled = true;
        disabled.filter_types = vec!["test.deleted".to_string()];
        store.save_endpoint(&mut disabled).expect("save");

        let all = store
            .list_endpoints(ListEndpointsParams {
                subscriber_id: sub.id,
                ..Default::default()
            })
            .expect("list all");
        assert_eq!(
            labels(&all),
            HashSet::from(["test-1".into(), "test-2".into(), "test-3".into()])
        );

        let enabled = store
            .list_endpoints(ListEndpointsParams {
                subscriber_id: sub.id,
                disabled: Some(false),
                ..Default::default()
            })
            .expect("list enabled");
        assert_eq!(
            labels(&enabled),
            HashSet::from(["test-1".into(), "test-2".into()])
        );

        let disabled_only = store
            .list_endpoints(ListEndpointsParams {
                subscriber_id: sub.id,
                disabled: Some(true),
                ..Default::default()
            })
            .expect("list disabled");
        assert_eq!(labels(&disabled_only), HashSet::from(["test-3".into()]));

        // An empty filter set means "all types", so test-2 matches both.
        let created = store
            .list_endpoints(ListEndpointsParams {
                subscriber_id: sub.id,
                filter_type: Some("test.created".to_string()),
                ..Default::default()
            })
            .expect("list created");
        assert_eq!(
            labels(&created),
            HashSet::from(["test-1".into(), "test-2".into()])
        );

        let deleted = store
            .list_endpoints(ListEndpointsParams {
                subscriber_id: sub.id,
                filter_type: Some("test.deleted".to_string()),
                ..Default::default()
            })
            .expect("list deleted");
        assert_eq!(
            labels(&deleted),
            HashSet::from(["test-2".into(), "test-3".into()])
        );

        let other_sub = saved_subscriber(&store);
        let none = store
            .list_endpoints(ListEndpointsParams {
                subscriber_id: other_sub.id,
                ..Default::default()
            })
            .expect("list other subscriber");
        assert!(none.is_empty());
    }

    #[test]
    fn remove_duplicates_keeps_unique_elements() {
        let mut values = vec!["a", "a", "b", "c", "b"];
        remove_duplicates(&mut values);
        values.sort_unstable();
        assert_eq!(values, vec!["a", "b", "c"]);
    }
}
