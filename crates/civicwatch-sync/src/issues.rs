//! The issue synchronization store.

use std::sync::Arc;

use civicwatch_auth::{AuthSession, AuthState};
use civicwatch_conf::Settings;
use civicwatch_store::{
	ChangeSet, ChangeSetStream, DocumentStore, FieldValue, Query, RemoteStoreError, WriteFields,
};
use civicwatch_types::{Issue, IssueStatus, NewIssue};
use futures_util::future::join_all;
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::reporter::ReporterCache;
use crate::{SyncError, SyncResult};

/// Observable snapshot state: the mapped issue collection and a loading
/// flag covering in-flight deliveries.
#[derive(Debug, Clone)]
pub struct IssueState {
	pub issues: Arc<Vec<Issue>>,
	pub is_loading: bool,
}

/// Subscription lifecycle. Guarded transitions under one lock make
/// `start` idempotent and serialize it against `stop`, so at most one
/// live subscription exists at any time.
enum Subscription {
	Idle,
	Subscribing,
	Active { worker: JoinHandle<()> },
	Stopping,
}

struct StoreShared {
	store: Arc<dyn DocumentStore>,
	settings: Arc<Settings>,
	cache: ReporterCache,
	state: watch::Sender<IssueState>,
	subscription: Mutex<Subscription>,
	auth: parking_lot::Mutex<Option<watch::Receiver<AuthState>>>,
}

/// Reactive store holding the full set of issues while a session is
/// active.
///
/// Construct once per session lifecycle, then [`IssueStore::bind`] it to
/// the auth session: the live query starts on the none->identity
/// transition and stops (clearing the snapshot and the reporter cache)
/// on identity->none.
pub struct IssueStore {
	shared: Arc<StoreShared>,
	lifecycle: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl IssueStore {
	pub fn new(store: Arc<dyn DocumentStore>, settings: Arc<Settings>) -> Self {
		let cache = ReporterCache::new(
			store.clone(),
			settings.store.users_collection.clone(),
			settings.sync.placeholder_avatar_url.clone(),
		);
		let (state, _) = watch::channel(IssueState {
			issues: Arc::new(Vec::new()),
			is_loading: true,
		});
		Self {
			shared: Arc::new(StoreShared {
				store,
				settings,
				cache,
				state,
				subscription: Mutex::new(Subscription::Idle),
				auth: parking_lot::Mutex::new(None),
			}),
			lifecycle: parking_lot::Mutex::new(None),
		}
	}

	/// Current snapshot.
	pub fn state(&self) -> IssueState {
		self.shared.state.borrow().clone()
	}

	/// Subscribe to snapshot changes.
	pub fn watch(&self) -> watch::Receiver<IssueState> {
		self.shared.state.subscribe()
	}

	/// Reporter cache backing this store's change-set mapping.
	pub fn reporter_cache(&self) -> &ReporterCache {
		&self.shared.cache
	}

	/// Drive the subscription lifecycle from the auth session: start on
	/// none->identity, stop on identity->none. Also records the session
	/// as the identity source for [`IssueStore::create_issue`].
	pub fn bind(&self, auth: &AuthSession) {
		let rx = auth.watch();
		*self.shared.auth.lock() = Some(rx.clone());

		let shared = self.shared.clone();
		let handle = tokio::spawn(async move {
			let mut rx = rx;
			let mut had_identity = rx.borrow_and_update().is_authenticated();
			if had_identity {
				shared.clone().start().await;
			}
			loop {
				if rx.changed().await.is_err() {
					break;
				}
				let has_identity = rx.borrow_and_update().is_authenticated();
				if has_identity == had_identity {
					continue;
				}
				had_identity = has_identity;
				if has_identity {
					shared.clone().start().await;
				} else {
					shared.stop().await;
				}
			}
		});
		if let Some(previous) = self.lifecycle.lock().replace(handle) {
			previous.abort();
		}
	}

	/// Open the live query. No-op when a subscription is already live or
	/// starting; normally driven by [`IssueStore::bind`].
	pub async fn start(&self) {
		self.shared.clone().start().await;
	}

	/// Close the live query, clear the snapshot to empty with loading
	/// false, and drop the reporter cache.
	pub async fn stop(&self) {
		self.shared.stop().await;
	}

	/// Write a new issue to the remote store.
	///
	/// Fails with [`SyncError::NotAuthenticated`] (performing no remote
	/// write) when no identity is present. The record is written with
	/// status Open, zeroed counters, server timestamps, and the current
	/// identity as reporter; it is **not** appended locally - the live
	/// subscription observes it on the next delivery.
	pub async fn create_issue(&self, new_issue: NewIssue) -> SyncResult<()> {
		let identity = self
			.shared
			.auth
			.lock()
			.as_ref()
			.and_then(|rx| rx.borrow().identity.clone())
			.ok_or(SyncError::NotAuthenticated)?;

		let mut fields: WriteFields = new_issue.document_fields().into();
		fields.insert("reporterId", FieldValue::string(identity.uid));
		fields.insert("status", FieldValue::string(IssueStatus::Open.as_str()));
		fields.insert("votes", json!(0).into());
		fields.insert("comments", json!(0).into());
		fields.insert("createdAt", FieldValue::ServerTimestamp);
		fields.insert("updatedAt", FieldValue::ServerTimestamp);

		self.shared
			.store
			.add_document(&self.shared.settings.store.issues_collection, fields)
			.await?;
		Ok(())
	}

	/// Write a new status and a refreshed timestamp for the given issue.
	///
	/// No precondition on the current status and none on subscription
	/// state: the write goes through even while logged out, in which
	/// case the result is simply never observed locally.
	pub async fn update_issue_status(
		&self,
		issue_id: &str,
		new_status: IssueStatus,
	) -> SyncResult<()> {
		let mut fields = WriteFields::new();
		fields.insert("status", FieldValue::string(new_status.as_str()));
		fields.insert("updatedAt", FieldValue::ServerTimestamp);

		self.shared
			.store
			.update_document(
				&self.shared.settings.store.issues_collection,
				issue_id,
				fields,
			)
			.await
			.map_err(|err| match err {
				RemoteStoreError::NotFound => SyncError::NotFound,
				other => SyncError::Store(other),
			})
	}
}

impl Drop for IssueStore {
	fn drop(&mut self) {
		if let Some(handle) = self.lifecycle.lock().take() {
			handle.abort();
		}
		if let Ok(mut subscription) = self.shared.subscription.try_lock() {
			if let Subscription::Active { worker } =
				std::mem::replace(&mut *subscription, Subscription::Idle)
			{
				worker.abort();
			}
		}
	}
}

impl StoreShared {
	async fn start(self: Arc<Self>) {
		let mut subscription = self.subscription.lock().await;
		match &*subscription {
			Subscription::Idle => {}
			// already live or mid-transition
			_ => return,
		}
		*subscription = Subscription::Subscribing;

		let query = Query::collection(self.settings.store.issues_collection.clone())
			.order_by_desc("createdAt");
		match self.store.subscribe(query).await {
			Ok(stream) => {
				debug!("issue subscription started");
				let worker = tokio::spawn(Self::run_subscription(self.clone(), stream));
				*subscription = Subscription::Active { worker };
			}
			Err(err) => {
				warn!(%err, "could not open issue subscription");
				*subscription = Subscription::Idle;
				self.state.send_modify(|state| state.is_loading = false);
			}
		}
	}

	async fn stop(&self) {
		let mut subscription = self.subscription.lock().await;
		let previous = std::mem::replace(&mut *subscription, Subscription::Stopping);
		if let Subscription::Active { worker } = previous {
			worker.abort();
			debug!("issue subscription stopped");
		}
		self.cache.clear().await;
		self.state.send_replace(IssueState {
			issues: Arc::new(Vec::new()),
			is_loading: false,
		});
		*subscription = Subscription::Idle;
	}

	async fn run_subscription(shared: Arc<Self>, mut stream: ChangeSetStream) {
		while let Some(delivery) = stream.next().await {
			match delivery {
				Ok(change_set) => {
					shared.state.send_modify(|state| state.is_loading = true);
					// Each delivery maps in its own task and replaces the
					// snapshot when it finishes. There is no sequence
					// guard: the last completed mapping wins, even if a
					// newer delivery already landed.
					let shared = shared.clone();
					tokio::spawn(async move {
						let issues = shared.map_change_set(change_set).await;
						shared.state.send_modify(move |state| {
							state.issues = Arc::new(issues);
							state.is_loading = false;
						});
					});
				}
				Err(err) => {
					// keep the last good snapshot, just stop the spinner
					warn!(%err, "issue subscription error");
					shared.state.send_modify(|state| state.is_loading = false);
				}
			}
		}
	}

	/// Re-map every document in the delivered result set, resolving each
	/// reporter through the cache. Server-side ordering is trusted.
	async fn map_change_set(&self, change_set: ChangeSet) -> Vec<Issue> {
		let mapped = join_all(change_set.docs.iter().map(|doc| async move {
			let reporter_id = doc
				.fields
				.get("reporterId")
				.and_then(Value::as_str)
				.unwrap_or_default();
			let reporter = self.cache.resolve(reporter_id).await;
			match Issue::from_document(doc.id.as_str(), &doc.fields, reporter) {
				Ok(issue) => Some(issue),
				Err(err) => {
					warn!(id = %doc.id, %err, "skipping unmappable issue document");
					None
				}
			}
		}))
		.await;
		mapped.into_iter().flatten().collect()
	}
}
