//! Identifier registry for placeholder resolution.
//!
//! Maps symbolic names used in fixtures to the ObjectIds that end up in the
//! database. One registry belongs to one fixture session; it only grows.

use std::collections::HashMap;
use std::sync::Arc;

use bson::oid::ObjectId;
use parking_lot::RwLock;

use crate::error::{FixtureError, FixtureResult};

type IdTable = Arc<RwLock<HashMap<String, ObjectId>>>;

/// Session-scoped table of symbolic name to ObjectId.
///
/// Cloning the registry yields another handle to the same table.
///
/// # Example
///
/// ```
/// # use reinhardt_mongo_fixtures::fixtures::IdentifierRegistry;
/// let registry = IdentifierRegistry::new();
/// let first = registry.resolve("alice");
/// assert_eq!(registry.resolve("alice"), first);
/// assert_ne!(registry.resolve("bob"), first);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
	ids: IdTable,
}

impl IdentifierRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry pre-seeded with known identifiers.
	///
	/// Values are hex strings as produced by [`ObjectId::to_hex`].
	///
	/// # Errors
	///
	/// Returns [`FixtureError::InvalidIdentifierFormat`] for the first value
	/// that is not a valid ObjectId.
	pub fn with_seed<I, K, V>(mapping: I) -> FixtureResult<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: AsRef<str>,
	{
		let mut ids = HashMap::new();
		for (name, hex) in mapping {
			let name = name.into();
			let hex = hex.as_ref();
			let id = ObjectId::parse_str(hex).map_err(|_| FixtureError::InvalidIdentifierFormat {
				name: name.clone(),
				value: hex.to_string(),
			})?;
			ids.insert(name, id);
		}

		Ok(Self {
			ids: Arc::new(RwLock::new(ids)),
		})
	}

	/// Returns the identifier bound to `name`, generating and binding a new
	/// one the first time the name is seen.
	pub fn resolve(&self, name: &str) -> ObjectId {
		if let Some(id) = self.ids.read().get(name) {
			return *id;
		}

		*self
			.ids
			.write()
			.entry(name.to_string())
			.or_insert_with(ObjectId::new)
	}

	/// Returns the identifier bound to `name` without generating one.
	pub fn get(&self, name: &str) -> Option<ObjectId> {
		self.ids.read().get(name).copied()
	}

	/// Checks whether `name` has been bound.
	pub fn contains(&self, name: &str) -> bool {
		self.ids.read().contains_key(name)
	}

	/// Returns the number of bound names.
	pub fn len(&self) -> usize {
		self.ids.read().len()
	}

	/// Returns true if no names are bound.
	pub fn is_empty(&self) -> bool {
		self.ids.read().is_empty()
	}

	/// Returns a read-only view of the live table.
	///
	/// Names resolved after the snapshot is taken are visible through it.
	pub fn snapshot(&self) -> IdMap {
		IdMap {
			ids: Arc::clone(&self.ids),
		}
	}
}

/// Read-only handle to a registry's identifiers, for test assertions.
#[derive(Debug, Clone)]
pub struct IdMap {
	ids: IdTable,
}

impl IdMap {
	/// Returns the identifier bound to `name`.
	pub fn get(&self, name: &str) -> Option<ObjectId> {
		self.ids.read().get(name).copied()
	}

	/// Returns the hex string form of the identifier bound to `name`.
	pub fn get_hex(&self, name: &str) -> Option<String> {
		self.get(name).map(|id| id.to_hex())
	}

	/// Checks whether `name` has been bound.
	pub fn contains(&self, name: &str) -> bool {
		self.ids.read().contains_key(name)
	}

	/// Returns the number of bound names.
	pub fn len(&self) -> usize {
		self.ids.read().len()
	}

	/// Returns true if no names are bound.
	pub fn is_empty(&self) -> bool {
		self.ids.read().is_empty()
	}

	/// Returns all bound names.
	pub fn names(&self) -> Vec<String> {
		self.ids.read().keys().cloned().collect()
	}

	/// Copies the current contents into a plain map.
	pub fn to_hash_map(&self) -> HashMap<String, ObjectId> {
		self.ids.read().clone()
	}
}
