//! Live-query descriptions.

/// Sort direction for an ordered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Ascending,
	Descending,
}

/// A collection query with an optional single-field ordering.
///
/// The synchronization layer only ever needs one shape - the issues
/// collection ordered by `createdAt` descending - but the ordering is
/// expressed explicitly so backends stay generic.
///
/// # Examples
///
/// ```
/// use civicwatch_store::Query;
///
/// let query = Query::collection("issues").order_by_desc("createdAt");
/// assert_eq!(query.collection, "issues");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
	pub collection: String,
	pub order_by: Option<(String, Direction)>,
}

impl Query {
	pub fn collection(name: impl Into<String>) -> Self {
		Self {
			collection: name.into(),
			order_by: None,
		}
	}

	pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
		self.order_by = Some((field.into(), direction));
		self
	}

	pub fn order_by_desc(self, field: impl Into<String>) -> Self {
		self.order_by(field, Direction::Descending)
	}

	/// Stable key identifying this query shape; backends fan deliveries
	/// out per key.
	pub fn key(&self) -> String {
		match &self.order_by {
			Some((field, Direction::Ascending)) => {
				format!("{}::{}::asc", self.collection, field)
			}
			Some((field, Direction::Descending)) => {
				format!("{}::{}::desc", self.collection, field)
			}
			None => self.collection.clone(),
		}
	}
}
