//! The identity-provider seam and the in-memory reference provider.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::hasher::{Argon2Hasher, PasswordHasher};
use crate::{AuthError, AuthResult};

const MIN_PASSWORD_LEN: usize = 6;

/// Identity as reported by the provider, before role resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
	pub uid: String,
	pub email: String,
	pub display_name: Option<String>,
	pub avatar_url: Option<String>,
}

/// Asynchronous seam over the hosted identity service.
///
/// `session_events` carries the provider's own session restoration: the
/// channel holds the currently signed-in user (or `None`) and updates on
/// every sign-in, sign-out, and provider-side restore, independent of
/// which call triggered it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
	/// Create a credential-backed account. Validates email syntax and
	/// password strength; rejects duplicate emails.
	async fn create_user(&self, email: &str, password: &str) -> AuthResult<ProviderUser>;

	/// Update the display name attached to the provider account.
	async fn update_display_name(&self, uid: &str, display_name: &str) -> AuthResult<()>;

	/// Authenticate with email and password.
	async fn sign_in(&self, email: &str, password: &str) -> AuthResult<ProviderUser>;

	/// Run the provider-hosted popup flow.
	async fn federated_sign_in(&self) -> AuthResult<ProviderUser>;

	/// End the provider-side session.
	async fn sign_out(&self) -> AuthResult<()>;

	/// Session-restoration channel; holds the current signed-in user.
	fn session_events(&self) -> watch::Receiver<Option<ProviderUser>>;
}

struct StoredAccount {
	uid: String,
	email: String,
	display_name: Option<String>,
	avatar_url: Option<String>,
	// empty for accounts created through the federated flow
	password_hash: String,
}

impl StoredAccount {
	fn to_user(&self) -> ProviderUser {
		ProviderUser {
			uid: self.uid.clone(),
			email: self.email.clone(),
			display_name: self.display_name.clone(),
			avatar_url: self.avatar_url.clone(),
		}
	}
}

/// In-memory [`IdentityProvider`] with argon2-hashed credentials.
///
/// Reference provider for tests and local development. The federated
/// popup flow resolves to the identity configured through
/// [`MemoryIdentityProvider::with_federated_identity`]; without one the
/// flow reports [`AuthError::PopupClosed`], which is what a dismissed
/// popup looks like to callers.
pub struct MemoryIdentityProvider {
	accounts: RwLock<HashMap<String, StoredAccount>>,
	hasher: Argon2Hasher,
	session: watch::Sender<Option<ProviderUser>>,
	federated: RwLock<Option<ProviderUser>>,
}

impl MemoryIdentityProvider {
	pub fn new() -> Self {
		let (session, _) = watch::channel(None);
		Self {
			accounts: RwLock::new(HashMap::new()),
			hasher: Argon2Hasher::new(),
			session,
			federated: RwLock::new(None),
		}
	}

	/// Configure the identity returned by the federated popup flow.
	pub async fn set_federated_identity(
		&self,
		email: impl Into<String>,
		display_name: impl Into<String>,
		avatar_url: Option<String>,
	) {
		let user = ProviderUser {
			uid: Uuid::new_v4().to_string(),
			email: email.into(),
			display_name: Some(display_name.into()),
			avatar_url,
		};
		*self.federated.write().await = Some(user);
	}

	/// Simulate the provider restoring a session (e.g. on page reload).
	pub async fn restore_session(&self, email: &str) -> AuthResult<()> {
		let accounts = self.accounts.read().await;
		let account = accounts
			.get(email)
			.ok_or(AuthError::InvalidCredential)?
			.to_user();
		drop(accounts);
		let _ = self.session.send(Some(account));
		Ok(())
	}

	fn validate_email(email: &str) -> AuthResult<()> {
		let Some((local, domain)) = email.split_once('@') else {
			return Err(AuthError::InvalidEmail);
		};
		if local.is_empty() || domain.is_empty() || domain.contains('@') {
			return Err(AuthError::InvalidEmail);
		}
		Ok(())
	}
}

impl Default for MemoryIdentityProvider {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
	async fn create_user(&self, email: &str, password: &str) -> AuthResult<ProviderUser> {
		Self::validate_email(email)?;
		if password.chars().count() < MIN_PASSWORD_LEN {
			return Err(AuthError::WeakPassword);
		}
		// hash before taking the lock; argon2 dominates the cost here
		let password_hash = self.hasher.hash(password)?;

		let mut accounts = self.accounts.write().await;
		if accounts.contains_key(email) {
			return Err(AuthError::EmailInUse);
		}
		let account = StoredAccount {
			uid: Uuid::new_v4().to_string(),
			email: email.to_string(),
			display_name: None,
			avatar_url: None,
			password_hash,
		};
		let user = account.to_user();
		accounts.insert(email.to_string(), account);
		drop(accounts);

		let _ = self.session.send(Some(user.clone()));
		Ok(user)
	}

	async fn update_display_name(&self, uid: &str, display_name: &str) -> AuthResult<()> {
		let mut accounts = self.accounts.write().await;
		let account = accounts
			.values_mut()
			.find(|account| account.uid == uid)
			.ok_or(AuthError::InvalidCredential)?;
		account.display_name = Some(display_name.to_string());
		let user = account.to_user();
		drop(accounts);

		// keep the live session view in step with the profile update
		self.session.send_if_modified(|current| match current {
			Some(session_user) if session_user.uid == user.uid => {
				*session_user = user.clone();
				true
			}
			_ => false,
		});
		Ok(())
	}

	async fn sign_in(&self, email: &str, password: &str) -> AuthResult<ProviderUser> {
		let accounts = self.accounts.read().await;
		let account = accounts.get(email).ok_or(AuthError::InvalidCredential)?;
		if account.password_hash.is_empty()
			|| !self.hasher.verify(password, &account.password_hash)?
		{
			return Err(AuthError::InvalidCredential);
		}
		let user = account.to_user();
		drop(accounts);

		let _ = self.session.send(Some(user.clone()));
		Ok(user)
	}

	async fn federated_sign_in(&self) -> AuthResult<ProviderUser> {
		let Some(user) = self.federated.read().await.clone() else {
			return Err(AuthError::PopupClosed);
		};

		let mut accounts = self.accounts.write().await;
		accounts
			.entry(user.email.clone())
			.or_insert_with(|| StoredAccount {
				uid: user.uid.clone(),
				email: user.email.clone(),
				display_name: user.display_name.clone(),
				avatar_url: user.avatar_url.clone(),
				password_hash: String::new(),
			});
		let user = accounts[&user.email].to_user();
		drop(accounts);

		let _ = self.session.send(Some(user.clone()));
		Ok(user)
	}

	async fn sign_out(&self) -> AuthResult<()> {
		let _ = self.session.send(None);
		Ok(())
	}

	fn session_events(&self) -> watch::Receiver<Option<ProviderUser>> {
		self.session.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("no-at-sign")]
	#[case("@missing-local")]
	#[case("missing-domain@")]
	#[case("double@@at.example")]
	#[tokio::test]
	async fn test_create_user_rejects_invalid_email(#[case] email: &str) {
		let provider = MemoryIdentityProvider::new();
		let result = provider.create_user(email, "password123").await;
		assert!(matches!(result, Err(AuthError::InvalidEmail)));
	}

	#[tokio::test]
	async fn test_create_user_rejects_short_password() {
		let provider = MemoryIdentityProvider::new();
		let result = provider.create_user("ada@example.com", "short").await;
		assert!(matches!(result, Err(AuthError::WeakPassword)));
	}

	#[tokio::test]
	async fn test_create_user_rejects_duplicate_email() {
		let provider = MemoryIdentityProvider::new();
		provider
			.create_user("ada@example.com", "password123")
			.await
			.unwrap();
		let result = provider.create_user("ada@example.com", "different456").await;
		assert!(matches!(result, Err(AuthError::EmailInUse)));
	}

	#[tokio::test]
	async fn test_sign_in_round_trip() {
		let provider = MemoryIdentityProvider::new();
		let created = provider
			.create_user("ada@example.com", "password123")
			.await
			.unwrap();
		let signed_in = provider
			.sign_in("ada@example.com", "password123")
			.await
			.unwrap();
		assert_eq!(created.uid, signed_in.uid);

		let wrong = provider.sign_in("ada@example.com", "password124").await;
		assert!(matches!(wrong, Err(AuthError::InvalidCredential)));
	}

	#[tokio::test]
	async fn test_federated_sign_in_without_identity_is_popup_closed() {
		let provider = MemoryIdentityProvider::new();
		let result = provider.federated_sign_in().await;
		assert!(matches!(result, Err(AuthError::PopupClosed)));
	}

	#[tokio::test]
	async fn test_federated_account_cannot_password_sign_in() {
		let provider = MemoryIdentityProvider::new();
		provider
			.set_federated_identity("ada@example.com", "Ada Lovelace", None)
			.await;
		provider.federated_sign_in().await.unwrap();

		let result = provider.sign_in("ada@example.com", "anything123").await;
		assert!(matches!(result, Err(AuthError::InvalidCredential)));
	}

	#[tokio::test]
	async fn test_session_events_track_sign_in_and_out() {
		let provider = MemoryIdentityProvider::new();
		let events = provider.session_events();
		assert!(events.borrow().is_none());

		provider
			.create_user("ada@example.com", "password123")
			.await
			.unwrap();
		assert!(events.borrow().is_some());

		provider.sign_out().await.unwrap();
		assert!(events.borrow().is_none());
	}
}
