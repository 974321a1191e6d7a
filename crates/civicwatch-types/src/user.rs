//! User profile documents and the denormalized reporter snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{DocumentError, Fields};

/// Account role. Role assignment happens outside the application; every
/// profile created in-app starts as `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	#[default]
	User,
	Admin,
}

impl Role {
	pub fn is_admin(&self) -> bool {
		matches!(self, Role::Admin)
	}
}

/// Profile document stored in the `users` collection.
///
/// `photoURL` keeps the identity provider's field name so profiles written
/// by earlier deployments remain readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	pub uid: String,
	pub display_name: String,
	pub email: String,
	#[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
	pub avatar_url: Option<String>,
	#[serde(default)]
	pub role: Role,
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,
}

impl UserProfile {
	/// Deserialize a raw `users` document.
	pub fn from_fields(fields: &Fields) -> Result<Self, DocumentError> {
		serde_json::from_value(serde_json::Value::Object(fields.clone()))
			.map_err(|err| DocumentError::invalid("users document", err.to_string()))
	}

	/// Serialize into a raw field map for a profile write.
	pub fn to_fields(&self) -> Fields {
		match serde_json::to_value(self) {
			Ok(serde_json::Value::Object(map)) => map,
			_ => Fields::new(),
		}
	}
}

/// Display fields embedded into an [`crate::Issue`] at read time to avoid
/// a join-like lookup on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterSnapshot {
	pub name: String,
	pub avatar_url: String,
}

impl ReporterSnapshot {
	/// Fallback snapshot used when the reporter profile cannot be read.
	///
	/// # Examples
	///
	/// ```
	/// use civicwatch_types::ReporterSnapshot;
	///
	/// let reporter = ReporterSnapshot::anonymous("https://placehold.co/40x40.png");
	/// assert_eq!(reporter.name, "Anonymous");
	/// ```
	pub fn anonymous(placeholder_avatar: &str) -> Self {
		Self {
			name: "Anonymous".to_string(),
			avatar_url: placeholder_avatar.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_role_serde_is_lowercase() {
		assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
		assert_eq!(
			serde_json::from_value::<Role>(json!("user")).unwrap(),
			Role::User
		);
	}

	#[test]
	fn test_profile_round_trip_keeps_photo_url_field() {
		let profile = UserProfile {
			uid: "u1".to_string(),
			display_name: "Ada Lovelace".to_string(),
			email: "ada@example.com".to_string(),
			avatar_url: Some("https://example.com/ada.png".to_string()),
			role: Role::Admin,
			created_at: Utc::now(),
		};
		let fields = profile.to_fields();
		assert!(fields.contains_key("photoURL"));
		assert_eq!(fields["displayName"], json!("Ada Lovelace"));

		let parsed = UserProfile::from_fields(&fields).unwrap();
		assert_eq!(parsed, profile);
	}

	#[test]
	fn test_profile_role_defaults_to_user() {
		let fields = match json!({
			"uid": "u1",
			"displayName": "Ada",
			"email": "ada@example.com",
			"createdAt": "2024-05-01T12:00:00Z"
		}) {
			serde_json::Value::Object(map) => map,
			_ => unreachable!(),
		};
		let parsed = UserProfile::from_fields(&fields).unwrap();
		assert_eq!(parsed.role, Role::User);
		assert_eq!(parsed.avatar_url, None);
	}
}
