//! The `DocumentStore` trait and its error taxonomy.

use async_trait::async_trait;

use crate::document::{Document, WriteFields};
use crate::query::Query;
use crate::subscription::ChangeSetStream;

/// Transport- and permission-level failures surfaced by a backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteStoreError {
	#[error("document not found")]
	NotFound,
	#[error("transport error: {0}")]
	Transport(String),
	#[error("permission denied: {0}")]
	PermissionDenied(String),
	#[error("serialization error: {0}")]
	Serialization(String),
}

pub type RemoteStoreResult<T> = Result<T, RemoteStoreError>;

/// Asynchronous document-store backend.
///
/// Implementations must resolve [`crate::FieldValue::ServerTimestamp`]
/// with a monotonically non-decreasing server clock, and deliver a full
/// current result set through [`DocumentStore::subscribe`] whenever a
/// matching collection changes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Insert a new document; the backend assigns and returns its id.
	async fn add_document(
		&self,
		collection: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<String>;

	/// Point read. `Ok(None)` when the id does not exist.
	async fn get_document(&self, collection: &str, id: &str)
	-> RemoteStoreResult<Option<Document>>;

	/// Merge the given fields into an existing document.
	/// Fails with [`RemoteStoreError::NotFound`] when the id is absent.
	async fn update_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<()>;

	/// Write a document at a caller-chosen id. With `merge` the fields
	/// are merged into any existing document; without it the document is
	/// replaced. Creates the document when absent either way.
	async fn set_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
		merge: bool,
	) -> RemoteStoreResult<()>;

	/// Open a live query. The returned stream yields the current
	/// matching set immediately, then again on every change.
	async fn subscribe(&self, query: Query) -> RemoteStoreResult<ChangeSetStream>;
}
