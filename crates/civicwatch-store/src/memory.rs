//! In-memory document store.
//!
//! Reference backend for [`crate::DocumentStore`]: collections live in a
//! shared map, and every mutation pushes a fresh full snapshot to all
//! live-query listeners. Tests and local development run entirely on
//! this backend; a hosted deployment swaps in an adapter for its
//! realtime database without touching the layers above.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use civicwatch_types::Fields;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;
use uuid::Uuid;

use crate::document::{Document, FieldValue, WriteFields};
use crate::query::{Direction, Query};
use crate::store_trait::{DocumentStore, RemoteStoreError, RemoteStoreResult};
use crate::subscription::{ChangeSet, ChangeSetStream};

const FANOUT_CAPACITY: usize = 64;

struct Watcher {
	query: Query,
	sender: broadcast::Sender<ChangeSet>,
}

struct MemoryState {
	collections: HashMap<String, HashMap<String, Fields>>,
	watchers: HashMap<String, Watcher>,
	// server clock high-water mark; resolved timestamps never go backwards
	last_timestamp: DateTime<Utc>,
}

/// In-memory [`DocumentStore`] backend.
///
/// # Examples
///
/// ```
/// use civicwatch_store::{DocumentStore, FieldValue, MemoryDocumentStore, WriteFields};
///
/// # async fn example() {
/// let store = MemoryDocumentStore::new();
/// let mut fields = WriteFields::new();
/// fields.insert("title", FieldValue::string("Pothole"));
/// fields.insert("createdAt", FieldValue::ServerTimestamp);
///
/// let id = store.add_document("issues", fields).await.unwrap();
/// let doc = store.get_document("issues", &id).await.unwrap().unwrap();
/// assert!(doc.fields.contains_key("createdAt"));
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
/// ```
#[derive(Clone)]
pub struct MemoryDocumentStore {
	state: Arc<RwLock<MemoryState>>,
}

impl MemoryDocumentStore {
	pub fn new() -> Self {
		Self {
			state: Arc::new(RwLock::new(MemoryState {
				collections: HashMap::new(),
				watchers: HashMap::new(),
				last_timestamp: DateTime::<Utc>::MIN_UTC,
			})),
		}
	}

	fn server_now(state: &mut MemoryState) -> DateTime<Utc> {
		let now = Utc::now();
		// strictly increasing even when the wall clock stalls or steps back
		let resolved = if now > state.last_timestamp {
			now
		} else {
			state.last_timestamp + chrono::Duration::microseconds(1)
		};
		state.last_timestamp = resolved;
		resolved
	}

	fn resolve_fields(fields: WriteFields, server_time: DateTime<Utc>) -> Fields {
		let mut resolved = Fields::new();
		for (key, value) in fields {
			let value = match value {
				FieldValue::Json(value) => value,
				FieldValue::ServerTimestamp => Value::String(
					server_time.to_rfc3339_opts(SecondsFormat::Micros, true),
				),
			};
			resolved.insert(key, value);
		}
		resolved
	}

	fn snapshot(state: &MemoryState, query: &Query) -> ChangeSet {
		let mut docs: Vec<Document> = state
			.collections
			.get(&query.collection)
			.map(|collection| {
				collection
					.iter()
					.map(|(id, fields)| Document {
						id: id.clone(),
						fields: fields.clone(),
					})
					.collect()
			})
			.unwrap_or_default();

		if let Some((field, direction)) = &query.order_by {
			docs.sort_by(|a, b| {
				let ordering = compare_field(&a.fields, &b.fields, field)
					// stable tie-break so equal keys do not shuffle between deliveries
					.then_with(|| a.id.cmp(&b.id));
				match direction {
					Direction::Ascending => ordering,
					Direction::Descending => ordering.reverse(),
				}
			});
		}

		ChangeSet { docs }
	}

	fn notify(state: &MemoryState, collection: &str) {
		for watcher in state.watchers.values() {
			if watcher.query.collection == collection {
				// a send only fails when every listener is gone; the
				// watcher entry stays for the next subscriber
				let _ = watcher.sender.send(Self::snapshot(state, &watcher.query));
			}
		}
	}
}

impl Default for MemoryDocumentStore {
	fn default() -> Self {
		Self::new()
	}
}

fn compare_field(a: &Fields, b: &Fields, field: &str) -> Ordering {
	let left = a.get(field);
	let right = b.get(field);
	match (as_timestamp(left), as_timestamp(right)) {
		(Some(left), Some(right)) => left.cmp(&right),
		_ => as_text(left).cmp(&as_text(right)),
	}
}

fn as_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
	value
		.and_then(Value::as_str)
		.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
		.map(|dt| dt.with_timezone(&Utc))
}

fn as_text(value: Option<&Value>) -> String {
	match value {
		Some(Value::String(s)) => s.clone(),
		Some(other) => other.to_string(),
		None => String::new(),
	}
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
	async fn add_document(
		&self,
		collection: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<String> {
		let mut state = self.state.write().await;
		let server_time = Self::server_now(&mut state);
		let id = Uuid::new_v4().to_string();
		let resolved = Self::resolve_fields(fields, server_time);
		state
			.collections
			.entry(collection.to_string())
			.or_default()
			.insert(id.clone(), resolved);
		debug!(collection, id = %id, "document added");
		Self::notify(&state, collection);
		Ok(id)
	}

	async fn get_document(
		&self,
		collection: &str,
		id: &str,
	) -> RemoteStoreResult<Option<Document>> {
		let state = self.state.read().await;
		Ok(state
			.collections
			.get(collection)
			.and_then(|docs| docs.get(id))
			.map(|fields| Document {
				id: id.to_string(),
				fields: fields.clone(),
			}))
	}

	async fn update_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
	) -> RemoteStoreResult<()> {
		let mut state = self.state.write().await;
		let server_time = Self::server_now(&mut state);
		let resolved = Self::resolve_fields(fields, server_time);
		let docs = state
			.collections
			.get_mut(collection)
			.ok_or(RemoteStoreError::NotFound)?;
		let existing = docs.get_mut(id).ok_or(RemoteStoreError::NotFound)?;
		existing.extend(resolved);
		debug!(collection, id, "document updated");
		Self::notify(&state, collection);
		Ok(())
	}

	async fn set_document(
		&self,
		collection: &str,
		id: &str,
		fields: WriteFields,
		merge: bool,
	) -> RemoteStoreResult<()> {
		let mut state = self.state.write().await;
		let server_time = Self::server_now(&mut state);
		let resolved = Self::resolve_fields(fields, server_time);
		let docs = state.collections.entry(collection.to_string()).or_default();
		match docs.get_mut(id) {
			Some(existing) if merge => {
				existing.extend(resolved);
			}
			_ => {
				docs.insert(id.to_string(), resolved);
			}
		}
		Self::notify(&state, collection);
		Ok(())
	}

	async fn subscribe(&self, query: Query) -> RemoteStoreResult<ChangeSetStream> {
		let mut state = self.state.write().await;
		let key = query.key();
		let receiver = match state.watchers.get(&key) {
			Some(watcher) => watcher.sender.subscribe(),
			None => {
				let (sender, receiver) = broadcast::channel(FANOUT_CAPACITY);
				state.watchers.insert(
					key,
					Watcher {
						query: query.clone(),
						sender,
					},
				);
				receiver
			}
		};
		let initial = Self::snapshot(&state, &query);
		Ok(ChangeSetStream::new(initial, receiver))
	}
}
