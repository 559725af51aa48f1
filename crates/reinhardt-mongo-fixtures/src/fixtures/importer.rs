//! Placeholder resolution.
//!
//! The importer turns a raw [`FixtureSet`] into a [`MaterializedFixtureSet`]
//! by replacing placeholder strings with identifiers from an
//! [`IdentifierRegistry`].

use bson::{Bson, Document};

use super::format::json_to_bson;
use super::{
	FieldValue, FixtureSet, IdentifierRegistry, MaterializedFixtureSet, Placeholder,
	PlaceholderKind, Record,
};

/// Resolves placeholders and keeps the last materialized set.
///
/// # Example
///
/// ```
/// # use reinhardt_mongo_fixtures::fixtures::{FixtureImporter, FixtureSet, IdentifierRegistry};
/// # use serde_json::json;
/// let registry = IdentifierRegistry::new();
/// let set = FixtureSet::from_value(json!({
///     "users": [{"_id": "__bob__", "name": "Bob"}],
///     "orders": [{"user": "__bob__", "user_hex": "___bob___"}],
/// }))
/// .unwrap();
///
/// let mut importer = FixtureImporter::new();
/// let materialized = importer.import(&set, &registry);
///
/// let bob = registry.resolve("bob");
/// let order = &materialized.documents("orders").unwrap()[0];
/// assert_eq!(order.get_object_id("user").unwrap(), bob);
/// assert_eq!(order.get_str("user_hex").unwrap(), bob.to_hex());
/// ```
#[derive(Debug, Default)]
pub struct FixtureImporter {
	active: Option<MaterializedFixtureSet>,
}

impl FixtureImporter {
	/// Creates an importer with no active fixtures.
	pub fn new() -> Self {
		Self::default()
	}

	/// Materializes a fixture set, growing the registry for every name seen
	/// for the first time.
	///
	/// The result also becomes the active fixture set.
	pub fn import(
		&mut self,
		fixtures: &FixtureSet,
		registry: &IdentifierRegistry,
	) -> MaterializedFixtureSet {
		let mut materialized = MaterializedFixtureSet::new();

		for (collection, records) in fixtures.iter() {
			let documents = records
				.iter()
				.map(|record| materialize_record(record, registry))
				.collect();
			materialized.insert(collection.to_string(), documents);
		}

		self.active = Some(materialized.clone());
		materialized
	}

	/// Returns the last materialized fixture set.
	pub fn active(&self) -> Option<&MaterializedFixtureSet> {
		self.active.as_ref()
	}
}

fn materialize_record(record: &Record, registry: &IdentifierRegistry) -> Document {
	let mut document = Document::new();
	for (field, value) in record {
		let value = match FieldValue::classify(value) {
			FieldValue::Scalar(value) => json_to_bson(value),
			FieldValue::Placeholder(placeholder) => resolve(placeholder, registry),
		};
		document.insert(field.clone(), value);
	}
	document
}

fn resolve(placeholder: Placeholder<'_>, registry: &IdentifierRegistry) -> Bson {
	let id = registry.resolve(placeholder.name);
	match placeholder.kind {
		PlaceholderKind::HexString => Bson::String(id.to_hex()),
		PlaceholderKind::ObjectId => Bson::ObjectId(id),
	}
}
