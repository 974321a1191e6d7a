//! Field-level helpers for mapping raw store documents into domain records.
//!
//! The hosted store hands back loosely-typed field maps; the mapping rules
//! here mirror what the store actually contains: required text fields are
//! errors when absent, while timestamps and counters degrade to defaults
//! so one malformed document cannot poison a whole change-set.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Raw field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// Error produced when a document cannot be mapped into a domain record.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentError {
	#[error("missing required field `{field}`")]
	Missing { field: String },
	#[error("invalid value for field `{field}`: {reason}")]
	Invalid { field: String, reason: String },
}

impl DocumentError {
	pub fn missing(field: impl Into<String>) -> Self {
		Self::Missing {
			field: field.into(),
		}
	}

	pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Invalid {
			field: field.into(),
			reason: reason.into(),
		}
	}
}

/// Extract a required string field.
pub fn require_string(fields: &Fields, field: &str) -> Result<String, DocumentError> {
	match fields.get(field) {
		Some(Value::String(s)) => Ok(s.clone()),
		Some(other) => Err(DocumentError::invalid(
			field,
			format!("expected string, got {other}"),
		)),
		None => Err(DocumentError::missing(field)),
	}
}

/// Extract an optional string field. Non-string values count as absent.
pub fn opt_string(fields: &Fields, field: &str) -> Option<String> {
	match fields.get(field) {
		Some(Value::String(s)) => Some(s.clone()),
		_ => None,
	}
}

/// Extract an RFC 3339 timestamp, falling back to the current time when
/// the field is absent or unparseable (matching the store mapper's
/// `?.toDate() ?? now` behavior).
pub fn timestamp_or_now(fields: &Fields, field: &str) -> DateTime<Utc> {
	opt_string(fields, field)
		.and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
		.map(|dt| dt.with_timezone(&Utc))
		.unwrap_or_else(Utc::now)
}

/// Extract an integer counter, defaulting to zero.
pub fn count_or_zero(fields: &Fields, field: &str) -> i64 {
	fields.get(field).and_then(Value::as_i64).unwrap_or(0)
}
