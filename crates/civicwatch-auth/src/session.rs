//! The reactive authentication session store.

use std::sync::Arc;

use civicwatch_conf::Settings;
use civicwatch_store::DocumentStore;
use civicwatch_types::{Role, UserProfile};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::AuthResult;
use crate::provider::{IdentityProvider, ProviderUser};

/// The authenticated identity, with its role resolved from the profile
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
	pub uid: String,
	pub display_name: String,
	pub email: String,
	pub avatar_url: Option<String>,
	pub role: Role,
}

/// Observable session state: the current identity (or none) and a
/// loading flag covering in-flight auth operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
	pub identity: Option<Identity>,
	pub is_loading: bool,
}

impl AuthState {
	pub fn is_authenticated(&self) -> bool {
		self.identity.is_some()
	}
}

struct SessionInner {
	provider: Arc<dyn IdentityProvider>,
	store: Arc<dyn DocumentStore>,
	settings: Arc<Settings>,
	state: watch::Sender<AuthState>,
}

impl SessionInner {
	fn set_loading(&self, is_loading: bool) {
		self.state.send_modify(|state| state.is_loading = is_loading);
	}

	fn set_identity(&self, identity: Option<Identity>) {
		self.state.send_modify(|state| {
			state.identity = identity;
			state.is_loading = false;
		});
	}

	/// Resolve the stored role for a uid; a missing or unreadable
	/// profile degrades to `Role::User`.
	async fn resolve_role(&self, uid: &str) -> Role {
		let collection = &self.settings.store.users_collection;
		match self.store.get_document(collection, uid).await {
			Ok(Some(doc)) => match UserProfile::from_fields(&doc.fields) {
				Ok(profile) => profile.role,
				Err(err) => {
					warn!(uid, %err, "unreadable profile document, assuming user role");
					Role::User
				}
			},
			Ok(None) => Role::User,
			Err(err) => {
				warn!(uid, %err, "profile lookup failed, assuming user role");
				Role::User
			}
		}
	}

	fn identity_for(&self, user: ProviderUser, role: Role) -> Identity {
		Identity {
			display_name: user.display_name.unwrap_or_else(|| user.email.clone()),
			uid: user.uid,
			email: user.email,
			avatar_url: user.avatar_url,
			role,
		}
	}
}

/// Process-wide reactive store for the current authenticated identity.
///
/// One instance per session lifecycle: construct it at startup, drop it
/// on shutdown. All data access gates on its state - the issue
/// synchronization layer subscribes via [`AuthSession::watch`] and
/// starts or stops its live query on identity transitions.
pub struct AuthSession {
	inner: Arc<SessionInner>,
	listener: JoinHandle<()>,
}

impl AuthSession {
	/// Build the session store and start the ambient listener that keeps
	/// it synchronized with the provider's own session restoration.
	pub fn new(
		provider: Arc<dyn IdentityProvider>,
		store: Arc<dyn DocumentStore>,
		settings: Arc<Settings>,
	) -> Self {
		let (state, _) = watch::channel(AuthState {
			identity: None,
			is_loading: true,
		});
		let inner = Arc::new(SessionInner {
			provider: provider.clone(),
			store,
			settings,
			state,
		});
		let events = provider.session_events();
		let listener = tokio::spawn(Self::run_session_listener(inner.clone(), events));
		Self { inner, listener }
	}

	/// Forward provider session events into the store, resolving roles
	/// as identities appear. Processes the provider's current value
	/// first, so a restored session is visible without any explicit
	/// call.
	async fn run_session_listener(
		inner: Arc<SessionInner>,
		mut events: watch::Receiver<Option<ProviderUser>>,
	) {
		loop {
			let user = events.borrow_and_update().clone();
			match user {
				Some(user) => {
					let role = inner.resolve_role(&user.uid).await;
					let identity = inner.identity_for(user, role);
					inner.set_identity(Some(identity));
				}
				None => inner.set_identity(None),
			}
			if events.changed().await.is_err() {
				break;
			}
		}
	}

	/// Current session state snapshot.
	pub fn state(&self) -> AuthState {
		self.inner.state.borrow().clone()
	}

	/// Subscribe to session-state changes.
	pub fn watch(&self) -> watch::Receiver<AuthState> {
		self.inner.state.subscribe()
	}

	/// Create an account, set its display name, and write the initial
	/// profile document with the default `user` role.
	pub async fn sign_up(
		&self,
		email: &str,
		password: &str,
		full_name: &str,
	) -> AuthResult<Identity> {
		self.inner.set_loading(true);
		match self.sign_up_inner(email, password, full_name).await {
			Ok(identity) => {
				self.inner.set_identity(Some(identity.clone()));
				Ok(identity)
			}
			Err(err) => {
				self.inner.set_loading(false);
				Err(err)
			}
		}
	}

	async fn sign_up_inner(
		&self,
		email: &str,
		password: &str,
		full_name: &str,
	) -> AuthResult<Identity> {
		let user = self.inner.provider.create_user(email, password).await?;
		self.inner
			.provider
			.update_display_name(&user.uid, full_name)
			.await?;

		let profile = UserProfile {
			uid: user.uid.clone(),
			display_name: full_name.to_string(),
			email: user.email.clone(),
			avatar_url: user.avatar_url.clone(),
			role: Role::User,
			created_at: Utc::now(),
		};
		let collection = &self.inner.settings.store.users_collection;
		self.inner
			.store
			.set_document(collection, &user.uid, profile.to_fields().into(), false)
			.await?;

		Ok(Identity {
			uid: user.uid,
			display_name: full_name.to_string(),
			email: user.email,
			avatar_url: user.avatar_url,
			role: Role::User,
		})
	}

	/// Authenticate with email and password, resolving the stored role.
	pub async fn login(&self, email: &str, password: &str) -> AuthResult<Identity> {
		self.inner.set_loading(true);
		let user = match self.inner.provider.sign_in(email, password).await {
			Ok(user) => user,
			Err(err) => {
				self.inner.set_loading(false);
				return Err(err);
			}
		};
		let role = self.inner.resolve_role(&user.uid).await;
		let identity = self.inner.identity_for(user, role);
		self.inner.set_identity(Some(identity.clone()));
		Ok(identity)
	}

	/// Run the provider-hosted popup flow. First-time use creates the
	/// profile document with the default role; return use keeps the
	/// stored role untouched.
	pub async fn login_with_provider(&self) -> AuthResult<Identity> {
		self.inner.set_loading(true);
		match self.login_with_provider_inner().await {
			Ok(identity) => {
				self.inner.set_identity(Some(identity.clone()));
				Ok(identity)
			}
			Err(err) => {
				self.inner.set_loading(false);
				Err(err)
			}
		}
	}

	async fn login_with_provider_inner(&self) -> AuthResult<Identity> {
		let user = self.inner.provider.federated_sign_in().await?;
		let collection = self.inner.settings.store.users_collection.clone();

		let existing = self
			.inner
			.store
			.get_document(&collection, &user.uid)
			.await?;
		let role = match existing {
			Some(doc) => {
				// refresh the display fields, leave role and createdAt alone
				let mut fields = civicwatch_store::WriteFields::new();
				fields.insert(
					"displayName",
					civicwatch_store::FieldValue::string(
						user.display_name.clone().unwrap_or_else(|| user.email.clone()),
					),
				);
				fields.insert(
					"email",
					civicwatch_store::FieldValue::string(user.email.clone()),
				);
				if let Some(avatar) = &user.avatar_url {
					fields.insert(
						"photoURL",
						civicwatch_store::FieldValue::string(avatar.as_str()),
					);
				}
				self.inner
					.store
					.set_document(&collection, &user.uid, fields, true)
					.await?;

				UserProfile::from_fields(&doc.fields)
					.map(|profile| profile.role)
					.unwrap_or_default()
			}
			None => {
				let profile = UserProfile {
					uid: user.uid.clone(),
					display_name: user
						.display_name
						.clone()
						.unwrap_or_else(|| user.email.clone()),
					email: user.email.clone(),
					avatar_url: user.avatar_url.clone(),
					role: Role::User,
					created_at: Utc::now(),
				};
				self.inner
					.store
					.set_document(&collection, &user.uid, profile.to_fields().into(), true)
					.await?;
				Role::User
			}
		};

		Ok(self.inner.identity_for(user, role))
	}

	/// End the session. Provider sign-out is best-effort: a transport
	/// failure is logged and the local session is cleared regardless.
	pub async fn logout(&self) {
		self.inner.set_loading(true);
		if let Err(err) = self.inner.provider.sign_out().await {
			warn!(%err, "provider sign-out failed, clearing local session anyway");
		}
		self.inner.set_identity(None);
	}
}

impl Drop for AuthSession {
	fn drop(&mut self) {
		self.listener.abort();
	}
}
