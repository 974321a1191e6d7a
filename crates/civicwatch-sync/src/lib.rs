//! # CivicWatch Sync
//!
//! The issue synchronization layer: a locally cached, continuously
//! updated snapshot of all reported issues, visible only while a session
//! is active.
//!
//! ## Architecture
//!
//! - [`IssueStore`]: reactive store holding the issue snapshot. Its live
//!   query starts when the auth session gains an identity and stops when
//!   the identity goes away; every change-set delivery re-maps the full
//!   result set and replaces the snapshot atomically.
//! - [`ReporterCache`]: memoizing uid -> display-snapshot lookup used
//!   while mapping, so reporter profiles are fetched at most once per
//!   subscription.
//! - [`suggest`]: the boundary around the remote category-suggestion
//!   service, degrading every failure to an empty suggestion list.
//!
//! ## Write-then-listen
//!
//! Writes are fire-and-forget: [`IssueStore::create_issue`] and
//! [`IssueStore::update_issue_status`] never touch the local snapshot.
//! Visibility is solely through the push channel, which means a
//! just-created record is briefly invisible until the next delivery
//! arrives.

pub mod issues;
pub mod reporter;
pub mod suggest;

pub use issues::{IssueState, IssueStore};
pub use reporter::ReporterCache;
pub use suggest::{CategorySuggester, SuggestionError, SuggestionRequest, suggest_categories};

use civicwatch_store::RemoteStoreError;

/// Synchronization-layer errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
	#[error("not authenticated")]
	NotAuthenticated,
	#[error("issue not found")]
	NotFound,
	#[error(transparent)]
	Store(#[from] RemoteStoreError),
}

pub type SyncResult<T> = Result<T, SyncError>;
