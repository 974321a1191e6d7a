//! Reporter cache: memoized uid -> display-snapshot resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use civicwatch_store::DocumentStore;
use civicwatch_types::ReporterSnapshot;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

/// Memoizing lookup from user id to the denormalized display snapshot
/// embedded in each issue.
///
/// A hit returns the cached entry without touching the store. A miss
/// performs one lookup and caches the result. A failed or empty lookup
/// returns the anonymous placeholder and caches nothing, so a later call
/// retries - intentionally not a negative cache.
///
/// Shared freely across concurrent mapping operations: concurrent
/// resolutions of the same uid compute the same value, so duplicate
/// writes are idempotent.
#[derive(Clone)]
pub struct ReporterCache {
	store: Arc<dyn DocumentStore>,
	users_collection: String,
	placeholder_avatar: String,
	entries: Arc<RwLock<HashMap<String, ReporterSnapshot>>>,
	hits: Arc<AtomicU64>,
	misses: Arc<AtomicU64>,
}

impl ReporterCache {
	pub fn new(
		store: Arc<dyn DocumentStore>,
		users_collection: impl Into<String>,
		placeholder_avatar: impl Into<String>,
	) -> Self {
		Self {
			store,
			users_collection: users_collection.into(),
			placeholder_avatar: placeholder_avatar.into(),
			entries: Arc::new(RwLock::new(HashMap::new())),
			hits: Arc::new(AtomicU64::new(0)),
			misses: Arc::new(AtomicU64::new(0)),
		}
	}

	/// Resolve a reporter's display snapshot.
	///
	/// An empty uid (an unattributed legacy document) resolves straight
	/// to the anonymous placeholder without a lookup.
	pub async fn resolve(&self, uid: &str) -> ReporterSnapshot {
		if uid.is_empty() {
			return ReporterSnapshot::anonymous(&self.placeholder_avatar);
		}

		if let Some(hit) = self.entries.read().await.get(uid).cloned() {
			self.hits.fetch_add(1, Ordering::Relaxed);
			return hit;
		}
		self.misses.fetch_add(1, Ordering::Relaxed);

		match self.store.get_document(&self.users_collection, uid).await {
			Ok(Some(doc)) => {
				let name = doc
					.fields
					.get("displayName")
					.and_then(Value::as_str)
					.filter(|name| !name.is_empty())
					.unwrap_or("Anonymous")
					.to_string();
				let avatar_url = doc
					.fields
					.get("photoURL")
					.and_then(Value::as_str)
					.unwrap_or(&self.placeholder_avatar)
					.to_string();
				let snapshot = ReporterSnapshot { name, avatar_url };
				self.entries
					.write()
					.await
					.insert(uid.to_string(), snapshot.clone());
				snapshot
			}
			Ok(None) => {
				warn!(uid, "reporter profile not found, using placeholder");
				ReporterSnapshot::anonymous(&self.placeholder_avatar)
			}
			Err(err) => {
				warn!(uid, %err, "could not fetch reporter info, using placeholder");
				ReporterSnapshot::anonymous(&self.placeholder_avatar)
			}
		}
	}

	/// Drop every cached entry. Called when the issue subscription
	/// stops.
	pub async fn clear(&self) {
		self.entries.write().await.clear();
	}

	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}

	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	pub fn misses(&self) -> u64 {
		self.misses.load(Ordering::Relaxed)
	}
}
