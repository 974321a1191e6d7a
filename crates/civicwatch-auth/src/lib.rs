//! # CivicWatch Auth
//!
//! Authentication for the CivicWatch synchronization core.
//!
//! ## Architecture
//!
//! Key modules in this crate:
//!
//! - [`provider`]: the [`IdentityProvider`] seam over the hosted identity
//!   service, plus the in-memory reference provider
//! - [`session`]: the reactive [`AuthSession`] store - the single source
//!   of truth gating all other data access
//! - [`guard`]: the admin route guard, the only wire-level
//!   access-control boundary in the system
//! - [`hasher`]: password hashing for the reference provider
//!
//! The session store owns the current identity for the lifetime of the
//! authenticated session: explicit operations (`sign_up`, `login`,
//! `login_with_provider`, `logout`) and the provider's own session
//! restoration both funnel into the same state channel, so consumers
//! observe exactly one `none -> present -> none` sequence per session.

pub mod guard;
pub mod hasher;
pub mod provider;
pub mod session;

pub use guard::{AdminGuard, Claims, GuardDecision, issue_token};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use provider::{IdentityProvider, MemoryIdentityProvider, ProviderUser};
pub use session::{AuthSession, AuthState, Identity};

use civicwatch_store::RemoteStoreError;

/// Authentication errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
	#[error("invalid email address")]
	InvalidEmail,
	#[error("password must be at least 6 characters")]
	WeakPassword,
	#[error("an account with this email already exists")]
	EmailInUse,
	#[error("invalid email or password")]
	InvalidCredential,
	#[error("sign-in popup was closed before completing")]
	PopupClosed,
	#[error("network error: {0}")]
	Network(String),
	#[error(transparent)]
	Store(#[from] RemoteStoreError),
	#[error("internal authentication error: {0}")]
	Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
