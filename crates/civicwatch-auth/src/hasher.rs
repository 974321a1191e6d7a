//! Password hashing for the reference identity provider.

use crate::{AuthError, AuthResult};

/// Password hasher trait
///
/// Implement this trait to swap in a custom hashing algorithm.
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password.
	fn hash(&self, password: &str) -> AuthResult<String>;

	/// Verifies a password against a hash.
	///
	/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't,
	/// or an error if verification fails.
	fn verify(&self, password: &str, hash: &str) -> AuthResult<bool>;
}

/// Argon2id password hasher
///
/// # Examples
///
/// ```
/// use civicwatch_auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("secure_password123").unwrap();
///
/// assert!(hasher.verify("secure_password123", &hash).unwrap());
/// assert!(!hasher.verify("wrong_password", &hash).unwrap());
/// ```
pub struct Argon2Hasher;

impl Argon2Hasher {
	pub fn new() -> Self {
		Self
	}
}

impl Default for Argon2Hasher {
	fn default() -> Self {
		Self::new()
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> AuthResult<String> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHasher as _, SaltString},
		};
		use rand::RngCore;

		let mut salt_bytes = [0u8; 16];
		rand::thread_rng().fill_bytes(&mut salt_bytes);

		let salt = SaltString::encode_b64(&salt_bytes)
			.map_err(|e| AuthError::Internal(e.to_string()))?;

		Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| AuthError::Internal(e.to_string()))
	}

	fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHash, PasswordVerifier},
		};

		let parsed_hash =
			PasswordHash::new(hash).map_err(|e| AuthError::Internal(e.to_string()))?;

		match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
			Ok(()) => Ok(true),
			Err(argon2::password_hash::Error::Password) => Ok(false),
			Err(e) => Err(AuthError::Internal(e.to_string())),
		}
	}
}
