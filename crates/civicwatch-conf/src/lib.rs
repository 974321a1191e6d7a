//! # CivicWatch Settings
//!
//! Configuration for CivicWatch deployments: collection names, auth
//! secrets, and sync display defaults.
//!
//! Settings resolve in three layers, later layers winning:
//!
//! 1. [`Settings::default`] - development defaults
//! 2. [`Settings::from_toml_str`] - a deployment's TOML file
//! 3. [`Settings::apply_env`] - `CIVICWATCH_*` environment overrides
//!
//! ## Example
//!
//! ```
//! use civicwatch_conf::Settings;
//!
//! let settings = Settings::from_toml_str(
//!     r#"
//!     [auth]
//!     secret_key = "not-for-production"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(settings.store.issues_collection, "issues");
//! assert_eq!(settings.auth.secret_key, "not-for-production");
//! ```

use serde::{Deserialize, Serialize};

/// Settings errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("failed to parse settings: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid settings: {0}")]
	Invalid(String),
}

/// Remote store collection names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
	pub issues_collection: String,
	pub users_collection: String,
}

impl Default for StoreSettings {
	fn default() -> Self {
		Self {
			issues_collection: "issues".to_string(),
			users_collection: "users".to_string(),
		}
	}
}

/// Authentication and route-guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
	/// Secret key for identity-token verification
	/// (SECURITY WARNING: keep secret in production!)
	pub secret_key: String,
	/// Cookie carrying the identity token on administrative requests
	pub token_cookie: String,
	/// Path prefixes that require an `admin` role
	pub admin_paths: Vec<String>,
}

impl Default for AuthSettings {
	fn default() -> Self {
		Self {
			secret_key: "insecure-dev-secret".to_string(),
			token_cookie: "token".to_string(),
			admin_paths: vec!["/dashboard".to_string(), "/issues".to_string()],
		}
	}
}

/// Synchronization-layer display defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
	/// Avatar shown for unresolved reporters
	pub placeholder_avatar_url: String,
}

impl Default for SyncSettings {
	fn default() -> Self {
		Self {
			placeholder_avatar_url: "https://placehold.co/40x40.png".to_string(),
		}
	}
}

/// Main settings structure for a CivicWatch deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub store: StoreSettings,
	pub auth: AuthSettings,
	pub sync: SyncSettings,
}

impl Settings {
	/// Parse settings from a TOML document; absent keys keep defaults.
	pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
		let settings: Settings = toml::from_str(raw)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Defaults plus `CIVICWATCH_*` environment overrides.
	pub fn from_env() -> Result<Self, SettingsError> {
		let mut settings = Settings::default();
		settings.apply_env();
		settings.validate()?;
		Ok(settings)
	}

	/// Apply `CIVICWATCH_*` environment overrides in place.
	pub fn apply_env(&mut self) {
		if let Ok(value) = std::env::var("CIVICWATCH_ISSUES_COLLECTION") {
			self.store.issues_collection = value;
		}
		if let Ok(value) = std::env::var("CIVICWATCH_USERS_COLLECTION") {
			self.store.users_collection = value;
		}
		if let Ok(value) = std::env::var("CIVICWATCH_SECRET_KEY") {
			self.auth.secret_key = value;
		}
		if let Ok(value) = std::env::var("CIVICWATCH_TOKEN_COOKIE") {
			self.auth.token_cookie = value;
		}
		if let Ok(value) = std::env::var("CIVICWATCH_PLACEHOLDER_AVATAR_URL") {
			self.sync.placeholder_avatar_url = value;
		}
	}

	/// Reject configurations that cannot work at runtime.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.auth.secret_key.is_empty() {
			return Err(SettingsError::Invalid(
				"auth.secret_key must not be empty".to_string(),
			));
		}
		if self.store.issues_collection.is_empty() || self.store.users_collection.is_empty() {
			return Err(SettingsError::Invalid(
				"store collection names must not be empty".to_string(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	#[test]
	fn test_defaults_match_hosted_layout() {
		let settings = Settings::default();
		assert_eq!(settings.store.issues_collection, "issues");
		assert_eq!(settings.store.users_collection, "users");
		assert_eq!(settings.auth.token_cookie, "token");
		assert_eq!(
			settings.auth.admin_paths,
			vec!["/dashboard".to_string(), "/issues".to_string()]
		);
	}

	#[test]
	fn test_partial_toml_keeps_defaults() {
		let settings = Settings::from_toml_str(
			r#"
			[store]
			issues_collection = "reports"
			"#,
		)
		.unwrap();
		assert_eq!(settings.store.issues_collection, "reports");
		assert_eq!(settings.store.users_collection, "users");
	}

	#[test]
	fn test_empty_secret_key_is_rejected() {
		let result = Settings::from_toml_str(
			r#"
			[auth]
			secret_key = ""
			"#,
		);
		assert!(matches!(result, Err(SettingsError::Invalid(_))));
	}

	#[test]
	#[serial]
	fn test_env_overrides_win() {
		unsafe {
			std::env::set_var("CIVICWATCH_SECRET_KEY", "from-env");
			std::env::set_var("CIVICWATCH_ISSUES_COLLECTION", "env-issues");
		}
		let settings = Settings::from_env().unwrap();
		unsafe {
			std::env::remove_var("CIVICWATCH_SECRET_KEY");
			std::env::remove_var("CIVICWATCH_ISSUES_COLLECTION");
		}
		assert_eq!(settings.auth.secret_key, "from-env");
		assert_eq!(settings.store.issues_collection, "env-issues");
	}
}
