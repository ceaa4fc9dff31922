//! # hookd-store
//!
//! Persistence core for the hookd webhook management plane, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that owns a
//! `rusqlite::Connection` and runs schema migrations before any other
//! operation, plus a borrowed [`Store`] view carrying the typed CRUD
//! operations for every domain model. [`Database::in_transaction`] binds a
//! `Store` to an atomic scope so multi-entity writes commit or roll back
//! together.

pub mod database;
pub mod endpoints;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod subscribers;

mod error;

pub use database::{Database, Store};
pub use endpoints::ListEndpointsParams;
pub use error::StoreError;
pub use models::*;
