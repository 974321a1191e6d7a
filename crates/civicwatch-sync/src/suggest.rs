//! Boundary around the remote category-suggestion service.
//!
//! The model call itself is an opaque collaborator; this module owns the
//! application-side contract: empty input never reaches the remote
//! service, and every failure degrades to an empty suggestion list.

use async_trait::async_trait;
use civicwatch_types::IssueCategory;
use tracing::error;

/// Input for a suggestion request: a free-text description and/or an
/// image payload as a data URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionRequest {
	pub description: Option<String>,
	pub photo_data_uri: Option<String>,
}

impl SuggestionRequest {
	pub fn from_description(description: impl Into<String>) -> Self {
		Self {
			description: Some(description.into()),
			photo_data_uri: None,
		}
	}

	/// True when there is nothing to send to the remote service.
	pub fn is_empty(&self) -> bool {
		let blank = |field: &Option<String>| {
			field
				.as_deref()
				.map(|value| value.trim().is_empty())
				.unwrap_or(true)
		};
		blank(&self.description) && blank(&self.photo_data_uri)
	}
}

/// Suggestion-service failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SuggestionError {
	#[error("suggestion service error: {0}")]
	Remote(String),
}

/// Opaque remote suggestion call.
#[async_trait]
pub trait CategorySuggester: Send + Sync {
	/// Return raw category names for the given request.
	async fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<String>, SuggestionError>;
}

/// Ask the suggestion service for categories, degrading every failure to
/// an empty list.
///
/// Empty input short-circuits without invoking the remote call, and
/// suggestions outside the fixed category enumeration are dropped.
pub async fn suggest_categories(
	suggester: &dyn CategorySuggester,
	request: &SuggestionRequest,
) -> Vec<IssueCategory> {
	if request.is_empty() {
		return Vec::new();
	}
	match suggester.suggest(request).await {
		Ok(raw) => raw
			.iter()
			.filter_map(|name| name.parse::<IssueCategory>().ok())
			.collect(),
		Err(err) => {
			error!(%err, "category suggestion failed");
			Vec::new()
		}
	}
}
