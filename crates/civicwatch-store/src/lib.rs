//! # CivicWatch Store
//!
//! Thin façade over a hosted document database, exposing the four
//! primitives the synchronization layer needs:
//!
//! - [`DocumentStore::add_document`]: insert with a server-assigned id
//! - [`DocumentStore::get_document`]: point read
//! - [`DocumentStore::update_document`] / [`DocumentStore::set_document`]:
//!   merge writes
//! - [`DocumentStore::subscribe`]: a live query delivering a
//!   [`ChangeSet`] (the full current matching set) on every change
//!
//! Server-resolved values are requested through
//! [`FieldValue::ServerTimestamp`]; the backend guarantees the resolved
//! timestamps are monotonically non-decreasing.
//!
//! [`MemoryDocumentStore`] is the reference backend: any push-capable
//! store (a WebSocket-fed cache, a hosted realtime database) can stand in
//! by implementing [`DocumentStore`].

pub mod document;
pub mod memory;
pub mod query;
pub mod store_trait;
pub mod subscription;

pub use document::{Document, FieldValue, WriteFields};
pub use memory::MemoryDocumentStore;
pub use query::{Direction, Query};
pub use store_trait::{DocumentStore, RemoteStoreError, RemoteStoreResult};
pub use subscription::{ChangeSet, ChangeSetStream};

// Re-exported so backends and callers agree on the raw field map type.
pub use civicwatch_types::Fields;
