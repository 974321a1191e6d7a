//! Documents and write-side field values.

use civicwatch_types::Fields;
use serde_json::Value;

/// A stored document: server-assigned id plus its raw field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	pub id: String,
	pub fields: Fields,
}

/// Write-side field value.
///
/// `ServerTimestamp` is a sentinel resolved by the backend at commit
/// time, so clients never write their own clock into `createdAt` /
/// `updatedAt`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	Json(Value),
	ServerTimestamp,
}

impl From<Value> for FieldValue {
	fn from(value: Value) -> Self {
		FieldValue::Json(value)
	}
}

impl FieldValue {
	pub fn string(value: impl Into<String>) -> Self {
		FieldValue::Json(Value::String(value.into()))
	}
}

/// Ordered set of field writes for one document.
///
/// # Examples
///
/// ```
/// use civicwatch_store::{FieldValue, WriteFields};
/// use serde_json::json;
///
/// let mut fields = WriteFields::new();
/// fields.insert("status", FieldValue::string("Open"));
/// fields.insert("votes", json!(0).into());
/// fields.insert("createdAt", FieldValue::ServerTimestamp);
/// assert_eq!(fields.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteFields {
	entries: Vec<(String, FieldValue)>,
}

impl WriteFields {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> &mut Self {
		self.entries.push((key.into(), value));
		self
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &(String, FieldValue)> {
		self.entries.iter()
	}
}

impl From<Fields> for WriteFields {
	fn from(fields: Fields) -> Self {
		Self {
			entries: fields
				.into_iter()
				.map(|(key, value)| (key, FieldValue::Json(value)))
				.collect(),
		}
	}
}

impl IntoIterator for WriteFields {
	type Item = (String, FieldValue);
	type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_write_fields_from_raw_map() {
		let mut raw = Fields::new();
		raw.insert("title".to_string(), json!("Pothole"));
		let fields = WriteFields::from(raw);
		assert_eq!(fields.len(), 1);
		assert_eq!(
			fields.iter().next().unwrap().1,
			FieldValue::Json(json!("Pothole"))
		);
	}
}
