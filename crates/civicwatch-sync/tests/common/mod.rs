//! Shared test doubles for the sync integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use civicwatch_store::{
	ChangeSetStream, Document, DocumentStore, FieldValue, MemoryDocumentStore, Query,
	RemoteStoreError, RemoteStoreResult, WriteFields,
};
use tokio::sync::Notify;

/// Delegating store that counts writes, profile lookups, and
/// subscriptions, with a switch that fails profile lookups.
pub struct CountingStore {
	inner: MemoryDocumentStore,
	pub adds: AtomicUsize,
	pub user_lookups: AtomicUsize,
	pub subscribes: AtomicUsize,
	pub fail_user_lookups: AtomicBool,
}

impl CountingStore {
	pub fn new(inner: MemoryDocumentStore) -> Self {
		Self {
			inner,
			adds: AtomicUsize::new(0),
			user_lookups: AtomicUsize::new(0),
			subscribes: AtomicUsize::new(0),
			fail_user_lookups: AtomicBool::new(false),
		}
	}
}

#[async_trait]
impl DocumentStore for CountingStore {
	async fn add_document(
		&self,
		collection: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<String> {
		self.adds.fetch_add(1, Ordering::SeqCst);
		self.inner.add_document(collection, fields).await
	}

	async fn get_document(
		&self,
		collection: &str,
		id: &str,
	) -> RemoteStoreResult<Option<Document>> {
		if collection == "users" {
			self.user_lookups.fetch_add(1, Ordering::SeqCst);
			if self.fail_user_lookups.load(Ordering::SeqCst) {
				return Err(RemoteStoreError::Transport(
					"simulated profile outage".to_string(),
				));
			}
		}
		self.inner.get_document(collection, id).await
	}

	async fn update_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<()> {
		self.inner.update_document(collection, id, fields).await
	}

	async fn set_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
		merge: bool,
	) -> RemoteStoreResult<()> {
		self.inner.set_document(collection, id, fields, merge).await
	}

	async fn subscribe(&self, query: Query) -> RemoteStoreResult<ChangeSetStream> {
		self.subscribes.fetch_add(1, Ordering::SeqCst);
		self.inner.subscribe(query).await
	}
}

/// Delegating store that parks the first lookup of one user id until
/// released, to pin down mapping-overlap behavior.
pub struct GatedStore {
	inner: MemoryDocumentStore,
	gated_uid: String,
	gate: Notify,
	armed: AtomicBool,
}

impl GatedStore {
	pub fn new(inner: MemoryDocumentStore, gated_uid: impl Into<String>) -> Self {
		Self {
			inner,
			gated_uid: gated_uid.into(),
			gate: Notify::new(),
			armed: AtomicBool::new(true),
		}
	}

	/// Let the parked lookup proceed.
	pub fn release(&self) {
		self.gate.notify_one();
	}
}

#[async_trait]
impl DocumentStore for GatedStore {
	async fn add_document(
		&self,
		collection: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<String> {
		self.inner.add_document(collection, fields).await
	}

	async fn get_document(
		&self,
		collection: &str,
		id: &str,
	) -> RemoteStoreResult<Option<Document>> {
		if collection == "users" && id == self.gated_uid && self.armed.swap(false, Ordering::SeqCst)
		{
			self.gate.notified().await;
		}
		self.inner.get_document(collection, id).await
	}

	async fn update_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<()> {
		self.inner.update_document(collection, id, fields).await
	}

	async fn set_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
		merge: bool,
	) -> RemoteStoreResult<()> {
		self.inner.set_document(collection, id, fields, merge).await
	}

	async fn subscribe(&self, query: Query) -> RemoteStoreResult<ChangeSetStream> {
		self.inner.subscribe(query).await
	}
}

/// A complete, mappable issue document for seeding the store directly.
pub fn issue_fields(title: &str, reporter_id: &str) -> WriteFields {
	let mut fields = WriteFields::new();
	fields.insert("title", FieldValue::string(title));
	fields.insert("description", FieldValue::string("seeded for tests"));
	fields.insert("category", FieldValue::string("Other"));
	fields.insert("status", FieldValue::string("Open"));
	fields.insert("location", FieldValue::string("Test Square"));
	fields.insert("reporterId", FieldValue::string(reporter_id));
	fields.insert("votes", serde_json::json!(0).into());
	fields.insert("comments", serde_json::json!(0).into());
	fields.insert("createdAt", FieldValue::ServerTimestamp);
	fields.insert("updatedAt", FieldValue::ServerTimestamp);
	fields
}

/// Seed a minimal reporter profile.
pub async fn seed_profile(store: &MemoryDocumentStore, uid: &str, display_name: &str) {
	let mut fields = WriteFields::new();
	fields.insert("uid", FieldValue::string(uid));
	fields.insert("displayName", FieldValue::string(display_name));
	fields.insert("email", FieldValue::string(format!("{uid}@example.com")));
	fields.insert("role", FieldValue::string("user"));
	store
		.set_document("users", uid, fields, true)
		.await
		.expect("profile seed failed");
}
