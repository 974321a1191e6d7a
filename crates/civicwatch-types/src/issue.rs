//! Issue records and the fixed category/status enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::document::{
	DocumentError, Fields, count_or_zero, opt_string, require_string, timestamp_or_now,
};
use crate::user::ReporterSnapshot;

/// Fixed category enumeration for reported issues.
///
/// Serialized with the human-readable names used on the wire, so stored
/// documents and AI suggestions can be parsed directly.
///
/// # Examples
///
/// ```
/// use civicwatch_types::IssueCategory;
///
/// let category: IssueCategory = "Road Maintenance".parse().unwrap();
/// assert_eq!(category, IssueCategory::RoadMaintenance);
/// assert_eq!(category.to_string(), "Road Maintenance");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCategory {
	#[serde(rename = "Road Maintenance")]
	RoadMaintenance,
	#[serde(rename = "Water and Sanitation")]
	WaterAndSanitation,
	#[serde(rename = "Electricity")]
	Electricity,
	#[serde(rename = "Waste Management")]
	WasteManagement,
	#[serde(rename = "Public Safety")]
	PublicSafety,
	#[serde(rename = "Other")]
	Other,
}

/// Unknown category string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown issue category: {0}")]
pub struct UnknownCategory(pub String);

impl IssueCategory {
	/// All categories, in form-display order.
	pub const ALL: [IssueCategory; 6] = [
		IssueCategory::RoadMaintenance,
		IssueCategory::WaterAndSanitation,
		IssueCategory::Electricity,
		IssueCategory::WasteManagement,
		IssueCategory::PublicSafety,
		IssueCategory::Other,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			IssueCategory::RoadMaintenance => "Road Maintenance",
			IssueCategory::WaterAndSanitation => "Water and Sanitation",
			IssueCategory::Electricity => "Electricity",
			IssueCategory::WasteManagement => "Waste Management",
			IssueCategory::PublicSafety => "Public Safety",
			IssueCategory::Other => "Other",
		}
	}
}

impl fmt::Display for IssueCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for IssueCategory {
	type Err = UnknownCategory;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.copied()
			.find(|category| category.as_str() == s)
			.ok_or_else(|| UnknownCategory(s.to_string()))
	}
}

/// Ordered status enumeration.
///
/// The derived ordering (`Open < Acknowledged < InProgress < Resolved`)
/// drives timeline display only; status updates are not constrained to
/// forward progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
	#[serde(rename = "Open")]
	Open,
	#[serde(rename = "Acknowledged")]
	Acknowledged,
	#[serde(rename = "In Progress")]
	InProgress,
	#[serde(rename = "Resolved")]
	Resolved,
}

/// Unknown status string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown issue status: {0}")]
pub struct UnknownStatus(pub String);

impl IssueStatus {
	/// All statuses, in progression order.
	pub const ALL: [IssueStatus; 4] = [
		IssueStatus::Open,
		IssueStatus::Acknowledged,
		IssueStatus::InProgress,
		IssueStatus::Resolved,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			IssueStatus::Open => "Open",
			IssueStatus::Acknowledged => "Acknowledged",
			IssueStatus::InProgress => "In Progress",
			IssueStatus::Resolved => "Resolved",
		}
	}
}

impl fmt::Display for IssueStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for IssueStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.copied()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| UnknownStatus(s.to_string()))
	}
}

/// A reported issue as seen by the synchronization layer.
///
/// `reporter` is a denormalized snapshot resolved at read time; the
/// authoritative link is `reporter_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
	pub id: String,
	pub title: String,
	pub description: String,
	pub category: IssueCategory,
	pub status: IssueStatus,
	pub location: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ai_hint: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub reporter_id: String,
	pub reporter: ReporterSnapshot,
	pub votes: i64,
	pub comments: i64,
}

impl Issue {
	/// Map a raw store document into an `Issue`, injecting the reporter
	/// snapshot resolved by the caller.
	///
	/// Required text fields (`title`, `description`, `category`, `status`,
	/// `location`) produce a [`DocumentError`] when absent or malformed;
	/// timestamps and counters fall back to defaults. A missing
	/// `reporterId` maps to the empty string, matching the store's
	/// treatment of unattributed legacy documents.
	pub fn from_document(
		id: impl Into<String>,
		fields: &Fields,
		reporter: ReporterSnapshot,
	) -> Result<Self, DocumentError> {
		let category: IssueCategory = require_string(fields, "category")?
			.parse()
			.map_err(|err: UnknownCategory| DocumentError::invalid("category", err.to_string()))?;
		let status: IssueStatus = require_string(fields, "status")?
			.parse()
			.map_err(|err: UnknownStatus| DocumentError::invalid("status", err.to_string()))?;

		Ok(Self {
			id: id.into(),
			title: require_string(fields, "title")?,
			description: require_string(fields, "description")?,
			category,
			status,
			location: require_string(fields, "location")?,
			image_url: opt_string(fields, "imageUrl"),
			ai_hint: opt_string(fields, "aiHint"),
			created_at: timestamp_or_now(fields, "createdAt"),
			updated_at: timestamp_or_now(fields, "updatedAt"),
			reporter_id: opt_string(fields, "reporterId").unwrap_or_default(),
			reporter,
			votes: count_or_zero(fields, "votes"),
			comments: count_or_zero(fields, "comments"),
		})
	}
}

/// Creation-form payload for a new issue.
///
/// Status, counters, reporter and timestamps are assigned by the
/// synchronization layer and the server, never by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
	pub title: String,
	pub description: String,
	pub category: IssueCategory,
	pub location: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ai_hint: Option<String>,
}

impl NewIssue {
	/// Serialize the form fields into a document field map.
	pub fn document_fields(&self) -> Fields {
		let mut fields = Fields::new();
		fields.insert("title".into(), Value::String(self.title.clone()));
		fields.insert(
			"description".into(),
			Value::String(self.description.clone()),
		);
		fields.insert(
			"category".into(),
			Value::String(self.category.as_str().to_string()),
		);
		fields.insert("location".into(), Value::String(self.location.clone()));
		if let Some(url) = &self.image_url {
			fields.insert("imageUrl".into(), Value::String(url.clone()));
		}
		if let Some(hint) = &self.ai_hint {
			fields.insert("aiHint".into(), Value::String(hint.clone()));
		}
		fields
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn issue_fields() -> Fields {
		match json!({
			"title": "Broken streetlight",
			"description": "Dark corner at 5th and Main",
			"category": "Electricity",
			"status": "Open",
			"location": "5th and Main",
			"createdAt": "2024-05-01T12:00:00Z",
			"updatedAt": "2024-05-01T12:00:00Z",
			"reporterId": "u1",
			"votes": 3,
			"comments": 1
		}) {
			Value::Object(map) => map,
			_ => unreachable!(),
		}
	}

	#[rstest]
	#[case("Road Maintenance", IssueCategory::RoadMaintenance)]
	#[case("Water and Sanitation", IssueCategory::WaterAndSanitation)]
	#[case("Electricity", IssueCategory::Electricity)]
	#[case("Waste Management", IssueCategory::WasteManagement)]
	#[case("Public Safety", IssueCategory::PublicSafety)]
	#[case("Other", IssueCategory::Other)]
	fn test_category_round_trip(#[case] name: &str, #[case] category: IssueCategory) {
		assert_eq!(name.parse::<IssueCategory>().unwrap(), category);
		assert_eq!(category.to_string(), name);
		assert_eq!(
			serde_json::to_value(category).unwrap(),
			Value::String(name.to_string())
		);
	}

	#[test]
	fn test_category_unknown_is_rejected() {
		assert!("Potholes".parse::<IssueCategory>().is_err());
	}

	#[test]
	fn test_status_ordering_follows_progression() {
		assert!(IssueStatus::Open < IssueStatus::Acknowledged);
		assert!(IssueStatus::Acknowledged < IssueStatus::InProgress);
		assert!(IssueStatus::InProgress < IssueStatus::Resolved);
	}

	#[test]
	fn test_status_wire_name_uses_spaces() {
		assert_eq!(
			serde_json::to_value(IssueStatus::InProgress).unwrap(),
			Value::String("In Progress".to_string())
		);
		assert_eq!(
			"In Progress".parse::<IssueStatus>().unwrap(),
			IssueStatus::InProgress
		);
	}

	#[test]
	fn test_issue_from_document() {
		let issue = Issue::from_document(
			"i1",
			&issue_fields(),
			ReporterSnapshot {
				name: "Ada".to_string(),
				avatar_url: "https://example.com/a.png".to_string(),
			},
		)
		.unwrap();

		assert_eq!(issue.id, "i1");
		assert_eq!(issue.category, IssueCategory::Electricity);
		assert_eq!(issue.status, IssueStatus::Open);
		assert_eq!(issue.reporter_id, "u1");
		assert_eq!(issue.reporter.name, "Ada");
		assert_eq!(issue.votes, 3);
		assert_eq!(issue.image_url, None);
	}

	#[test]
	fn test_issue_from_document_missing_title_fails() {
		let mut fields = issue_fields();
		fields.remove("title");
		let result = Issue::from_document("i1", &fields, ReporterSnapshot::anonymous("p.png"));
		assert!(matches!(result, Err(DocumentError::Missing { .. })));
	}

	#[test]
	fn test_issue_from_document_defaults_counts_and_reporter() {
		let mut fields = issue_fields();
		fields.remove("votes");
		fields.remove("comments");
		fields.remove("reporterId");
		let issue =
			Issue::from_document("i1", &fields, ReporterSnapshot::anonymous("p.png")).unwrap();
		assert_eq!(issue.votes, 0);
		assert_eq!(issue.comments, 0);
		assert_eq!(issue.reporter_id, "");
	}

	#[test]
	fn test_new_issue_document_fields_skips_absent_optionals() {
		let new_issue = NewIssue {
			title: "Overflowing bin".to_string(),
			description: "Corner bin has not been emptied".to_string(),
			category: IssueCategory::WasteManagement,
			location: "Market Square".to_string(),
			image_url: None,
			ai_hint: None,
		};
		let fields = new_issue.document_fields();
		assert_eq!(fields["category"], json!("Waste Management"));
		assert!(!fields.contains_key("imageUrl"));
		assert!(!fields.contains_key("aiHint"));
	}
}
