//! # CivicWatch
//!
//! Core of a community issue-reporting application: residents submit
//! civic problems (infrastructure defects, outages, safety hazards) and
//! an administrator triages them, with all state synchronized live from
//! a hosted document store.
//!
//! This facade crate re-exports the workspace members:
//!
//! - `civicwatch-types` - domain model (always available)
//! - `civicwatch-conf` - deployment settings (`conf` feature)
//! - `civicwatch-store` - document-store façade and live queries
//!   (`store` feature)
//! - `civicwatch-auth` - the auth session store and admin route guard
//!   (`auth` feature)
//! - `civicwatch-sync` - the issue synchronization store and reporter
//!   cache (`sync` feature)
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use civicwatch::auth::{AuthSession, MemoryIdentityProvider};
//! use civicwatch::conf::Settings;
//! use civicwatch::store::MemoryDocumentStore;
//! use civicwatch::sync::IssueStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Arc::new(Settings::default());
//! let store = Arc::new(MemoryDocumentStore::new());
//! let provider = Arc::new(MemoryIdentityProvider::new());
//!
//! // one session store and one issue store per application lifecycle
//! let session = AuthSession::new(provider, store.clone(), settings.clone());
//! let issues = IssueStore::new(store, settings);
//! issues.bind(&session);
//!
//! // logging in starts the live query; the snapshot follows
//! session.sign_up("ada@example.com", "password123", "Ada Lovelace").await?;
//! let _snapshot = issues.watch();
//! # Ok(())
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
//! ```

pub use civicwatch_types as types;

#[cfg(feature = "conf")]
pub use civicwatch_conf as conf;

#[cfg(feature = "store")]
pub use civicwatch_store as store;

#[cfg(feature = "auth")]
pub use civicwatch_auth as auth;

#[cfg(feature = "sync")]
pub use civicwatch_sync as sync;

/// Commonly used items, re-exported in one place.
pub mod prelude {
	pub use civicwatch_types::{
		Issue, IssueCategory, IssueStatus, NewIssue, ReporterSnapshot, Role, UserProfile,
	};

	#[cfg(feature = "conf")]
	pub use civicwatch_conf::Settings;

	#[cfg(feature = "store")]
	pub use civicwatch_store::{
		ChangeSet, DocumentStore, FieldValue, MemoryDocumentStore, Query, RemoteStoreError,
		WriteFields,
	};

	#[cfg(feature = "auth")]
	pub use civicwatch_auth::{
		AdminGuard, AuthError, AuthSession, AuthState, GuardDecision, Identity, IdentityProvider,
		MemoryIdentityProvider,
	};

	#[cfg(feature = "sync")]
	pub use civicwatch_sync::{IssueState, IssueStore, ReporterCache, SyncError};
}
