//! Domain model structs persisted in the hookd database.
//!
//! Every struct derives `Serialize` and `Deserialize` so the transport
//! layer can map records directly onto API payloads.
//!
//! Server-assigned fields (ids and timestamps) are zeroed by the
//! constructors and populated by the store on save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// A consumer of webhook messages and the root of the ownership tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscriber {
    /// Unique subscriber identifier, assigned on save.
    pub id: Uuid,
    /// Human-readable name. Length limits are enforced by the caller.
    pub name: String,
    /// Opaque structured payload attached by the caller, stored as a JSON
    /// blob. `Null` is treated as absent and normalized to an empty object
    /// on save.
    pub metadata: Value,
    /// Set once on save.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful mutation.
    pub updated_at: DateTime<Utc>,
}

impl Subscriber {
    /// Build a subscriber ready for [`crate::Store::save_subscriber`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            metadata: Value::Null,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// A single delivery target owned by exactly one subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Unique endpoint identifier, assigned on save.
    pub id: Uuid,
    /// Free-text label.
    pub label: String,
    /// Delivery URL (http or https with a non-empty host; validated by the
    /// caller).
    pub url: String,
    /// Opaque bearer token issued at creation, used to sign deliveries.
    /// Never regenerated automatically.
    pub secret: String,
    /// Disabled endpoints are skipped by delivery.
    pub disabled: bool,
    /// Event types this endpoint is restricted to. Treated as a set: the
    /// store drops duplicates on every save and update. Empty means the
    /// endpoint receives all types.
    pub filter_types: Vec<String>,
    /// Owning subscriber. Referential integrity is enforced by the engine.
    pub subscriber_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Endpoint {
    /// Build an endpoint ready for [`crate::Store::save_endpoint`].
    pub fn new(
        label: impl Into<String>,
        url: impl Into<String>,
        secret: impl Into<String>,
        subscriber_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            label: label.into(),
            url: url.into(),
            secret: secret.into(),
            disabled: false,
            filter_types: Vec::new(),
            subscriber_id,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// An inbound event recorded for a subscriber.
///
/// Messages are write-once: once recorded they are read or deleted, never
/// updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier, assigned on save.
    pub id: Uuid,
    /// Event type, matched against endpoint filter sets.
    pub event_type: String,
    /// Opaque payload, stored verbatim.
    pub data: Value,
    /// Free-text labels. Unlike endpoint filter types, duplicates are
    /// preserved exactly as submitted.
    pub tags: Vec<String>,
    /// Owning subscriber.
    pub subscriber_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message ready for [`crate::Store::save_message`].
    pub fn new(event_type: impl Into<String>, data: Value, subscriber_id: Uuid) -> Self {
        Self {
            id: Uuid::nil(),
            event_type: event_type.into(),
            data,
            tags: Vec::new(),
            subscriber_id,
            created_at: DateTime::UNIX_EPOCH,
        }
    }
}
