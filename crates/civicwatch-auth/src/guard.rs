//! Admin route guard.
//!
//! Inbound requests to administrative paths must carry a verifiable
//! identity token with role `admin` in the session cookie. This is the
//! only wire-level access-control boundary in the system; everything
//! else gates on [`crate::AuthSession`] state.

use chrono::{Duration, Utc};
use civicwatch_conf::Settings;
use civicwatch_types::Role;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AuthError, AuthResult};

/// Identity-token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	pub sub: String,
	pub role: Role,
	pub exp: i64,
}

/// Outcome of a guard check, mirroring the redirect semantics of the
/// original edge middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
	Allow,
	RedirectToLogin,
	RedirectToHome,
}

/// Route guard verifying admin access on configured path prefixes.
///
/// # Examples
///
/// ```
/// use civicwatch_auth::{AdminGuard, GuardDecision, issue_token};
/// use civicwatch_conf::Settings;
/// use civicwatch_types::Role;
///
/// let settings = Settings::default();
/// let guard = AdminGuard::new(&settings);
/// let token = issue_token(&settings.auth.secret_key, "u1", Role::Admin, 3600).unwrap();
///
/// assert_eq!(guard.check("/dashboard", Some(&token)), GuardDecision::Allow);
/// assert_eq!(guard.check("/dashboard", None), GuardDecision::RedirectToLogin);
/// assert_eq!(guard.check("/", None), GuardDecision::Allow);
/// ```
pub struct AdminGuard {
	decoding_key: DecodingKey,
	validation: Validation,
	admin_paths: Vec<String>,
}

impl AdminGuard {
	pub fn new(settings: &Settings) -> Self {
		Self {
			decoding_key: DecodingKey::from_secret(settings.auth.secret_key.as_bytes()),
			validation: Validation::new(Algorithm::HS256),
			admin_paths: settings.auth.admin_paths.clone(),
		}
	}

	/// Decide whether a request may proceed.
	///
	/// Non-admin paths always pass. On admin paths: a missing or
	/// unverifiable token redirects to login; a verified token without
	/// the `admin` role redirects home.
	pub fn check(&self, path: &str, token: Option<&str>) -> GuardDecision {
		if !self.is_admin_path(path) {
			return GuardDecision::Allow;
		}
		let Some(token) = token else {
			return GuardDecision::RedirectToLogin;
		};
		match decode::<Claims>(token, &self.decoding_key, &self.validation) {
			Ok(data) if data.claims.role.is_admin() => GuardDecision::Allow,
			Ok(_) => GuardDecision::RedirectToHome,
			Err(err) => {
				debug!(%err, path, "identity token failed verification");
				GuardDecision::RedirectToLogin
			}
		}
	}

	fn is_admin_path(&self, path: &str) -> bool {
		self.admin_paths
			.iter()
			.any(|prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
	}
}

/// Mint an identity token for the given uid and role, valid for
/// `ttl_seconds`.
pub fn issue_token(secret: &str, uid: &str, role: Role, ttl_seconds: i64) -> AuthResult<String> {
	let claims = Claims {
		sub: uid.to_string(),
		role,
		exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp(),
	};
	encode(
		&Header::default(),
		&claims,
		&EncodingKey::from_secret(secret.as_bytes()),
	)
	.map_err(|err| AuthError::Internal(err.to_string()))
}
