//! Fixture format definitions.
//!
//! This module defines the data structures fixtures are parsed into and the
//! documents they are materialized as.

use std::collections::BTreeMap;
use std::path::Path;

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single fixture record: field name to field value.
///
/// Field values are arbitrary JSON values. String values may be
/// placeholder references, see [`Placeholder`](super::Placeholder).
pub type Record = Map<String, Value>;

/// Supported fixture file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureFormat {
	/// JSON format.
	#[default]
	Json,

	/// YAML format (requires `yaml` feature).
	Yaml,
}

impl FixtureFormat {
	/// Determines the fixture format from a file extension.
	///
	/// Matching is case-insensitive. `yml` and `yaml` are only recognized
	/// when the `yaml` feature is enabled.
	///
	/// # Example
	///
	/// ```
	/// # use reinhardt_mongo_fixtures::fixtures::FixtureFormat;
	/// assert_eq!(FixtureFormat::from_extension("JSON"), Some(FixtureFormat::Json));
	/// assert_eq!(FixtureFormat::from_extension("csv"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"json" => Some(Self::Json),
			#[cfg(feature = "yaml")]
			"yml" | "yaml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Determines the fixture format from a file path.
	///
	/// Returns `None` when the path has no extension or the extension is
	/// not recognized.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Self::from_extension)
	}

	/// Returns the default file extension for this format.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Yaml => "yml",
		}
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json => write!(f, "JSON"),
			Self::Yaml => write!(f, "YAML"),
		}
	}
}

/// Raw fixture definitions grouped by target collection.
///
/// Placeholders are not resolved yet; pass the set through a
/// [`FixtureImporter`](super::FixtureImporter) to get documents ready for
/// insertion.
///
/// # Example
///
/// ```
/// # use reinhardt_mongo_fixtures::fixtures::FixtureSet;
/// # use serde_json::json;
/// let set = FixtureSet::from_value(json!({
///     "users": [{"name": "Bob", "_id": "__bob__"}],
/// }))
/// .unwrap();
/// assert_eq!(set.records("users").map(|r| r.len()), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureSet {
	collections: BTreeMap<String, Vec<Record>>,
}

impl FixtureSet {
	/// Creates an empty fixture set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a fixture set from a JSON value of the form
	/// `{"collection": [{...}, ...], ...}`.
	///
	/// Returns a description of the problem when the value has a different
	/// shape.
	pub fn from_value(value: Value) -> Result<Self, String> {
		let Value::Object(collections) = value else {
			return Err(format!(
				"expected a mapping of collection names to records, found {}",
				kind_of(&value)
			));
		};

		let mut set = Self::new();
		for (name, records) in collections {
			let records = records_from_value(records)
				.map_err(|message| format!("collection '{}': {}", name, message))?;
			set.insert(name, records);
		}
		Ok(set)
	}

	/// Inserts the records for a collection, replacing any previous ones.
	pub fn insert(
		&mut self,
		collection: impl Into<String>,
		records: Vec<Record>,
	) -> Option<Vec<Record>> {
		self.collections.insert(collection.into(), records)
	}

	/// Adds the records for a collection using the builder pattern.
	pub fn with_collection(mut self, collection: impl Into<String>, records: Vec<Record>) -> Self {
		self.insert(collection, records);
		self
	}

	/// Returns the records of a collection.
	pub fn records(&self, collection: &str) -> Option<&[Record]> {
		self.collections.get(collection).map(Vec::as_slice)
	}

	/// Returns true if the set holds records for the collection.
	pub fn contains(&self, collection: &str) -> bool {
		self.collections.contains_key(collection)
	}

	/// Returns the collection names in sorted order.
	pub fn collection_names(&self) -> impl Iterator<Item = &str> {
		self.collections.keys().map(String::as_str)
	}

	/// Returns the number of collections.
	pub fn len(&self) -> usize {
		self.collections.len()
	}

	/// Returns true if there are no collections.
	pub fn is_empty(&self) -> bool {
		self.collections.is_empty()
	}

	/// Returns the total number of records across all collections.
	pub fn record_count(&self) -> usize {
		self.collections.values().map(Vec::len).sum()
	}

	/// Returns an iterator over collection names and their records.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
		self.collections
			.iter()
			.map(|(name, records)| (name.as_str(), records.as_slice()))
	}
}

impl<'a> IntoIterator for &'a FixtureSet {
	type Item = (&'a String, &'a Vec<Record>);
	type IntoIter = std::collections::btree_map::Iter<'a, String, Vec<Record>>;

	fn into_iter(self) -> Self::IntoIter {
		self.collections.iter()
	}
}

impl FromIterator<(String, Vec<Record>)> for FixtureSet {
	fn from_iter<I: IntoIterator<Item = (String, Vec<Record>)>>(iter: I) -> Self {
		Self {
			collections: iter.into_iter().collect(),
		}
	}
}

/// Fixture documents with every placeholder resolved, ready for insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializedFixtureSet {
	collections: BTreeMap<String, Vec<Document>>,
}

impl MaterializedFixtureSet {
	/// Creates an empty materialized set.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn insert(&mut self, collection: String, documents: Vec<Document>) {
		self.collections.insert(collection, documents);
	}

	/// Returns the documents of a collection.
	pub fn documents(&self, collection: &str) -> Option<&[Document]> {
		self.collections.get(collection).map(Vec::as_slice)
	}

	/// Returns the collection names in sorted order.
	pub fn collection_names(&self) -> impl Iterator<Item = &str> {
		self.collections.keys().map(String::as_str)
	}

	/// Returns the number of collections.
	pub fn len(&self) -> usize {
		self.collections.len()
	}

	/// Returns true if there are no collections.
	pub fn is_empty(&self) -> bool {
		self.collections.is_empty()
	}

	/// Returns the total number of documents across all collections.
	pub fn document_count(&self) -> usize {
		self.collections.values().map(Vec::len).sum()
	}

	/// Returns an iterator over collection names and their documents.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[Document])> {
		self.collections
			.iter()
			.map(|(name, documents)| (name.as_str(), documents.as_slice()))
	}
}

/// Interprets a JSON value as a list of records.
///
/// A single object is accepted as a one-record list.
pub(crate) fn records_from_value(value: Value) -> Result<Vec<Record>, String> {
	match value {
		Value::Array(items) => items
			.into_iter()
			.enumerate()
			.map(|(idx, item)| match item {
				Value::Object(record) => Ok(record),
				other => Err(format!(
					"invalid record at index {}: expected an object, found {}",
					idx,
					kind_of(&other)
				)),
			})
			.collect(),
		Value::Object(record) => Ok(vec![record]),
		other => Err(format!("expected a list of records, found {}", kind_of(&other))),
	}
}

/// Converts a JSON value into its BSON counterpart.
///
/// Integers become `Int32` when they fit and `Int64` otherwise; every other
/// number becomes `Double`. This includes integers above `i64::MAX`, which
/// lose precision: `18446744073709551615` is stored as
/// `1.8446744073709552e19`. Extended JSON (`{"$oid": ...}`) is not
/// interpreted.
pub fn json_to_bson(value: &Value) -> Bson {
	match value {
		Value::Null => Bson::Null,
		Value::Bool(b) => Bson::Boolean(*b),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				i32::try_from(i).map(Bson::Int32).unwrap_or(Bson::Int64(i))
			} else {
				Bson::Double(n.as_f64().unwrap_or(f64::NAN))
			}
		}
		Value::String(s) => Bson::String(s.clone()),
		Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
		Value::Object(map) => {
			let mut doc = Document::new();
			for (key, value) in map {
				doc.insert(key.clone(), json_to_bson(value));
			}
			Bson::Document(doc)
		}
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
