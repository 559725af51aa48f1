//! In-memory fixture store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::Document;
use parking_lot::RwLock;

use super::FixtureStore;
use crate::error::FixtureResult;

/// Fixture store that keeps collections in memory.
///
/// Clones share the same collections, so a test can keep a handle for
/// inspection after moving the store into a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryFixtureStore {
	collections: Arc<RwLock<BTreeMap<String, Vec<Document>>>>,
	torn_down: Arc<AtomicBool>,
}

impl MemoryFixtureStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of the documents in a collection.
	pub fn collection(&self, name: &str) -> Option<Vec<Document>> {
		self.collections.read().get(name).cloned()
	}

	/// Returns the names of existing collections in sorted order.
	pub fn collection_names(&self) -> Vec<String> {
		self.collections.read().keys().cloned().collect()
	}

	/// Returns true once [`FixtureStore::teardown`] has run.
	pub fn is_torn_down(&self) -> bool {
		self.torn_down.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl FixtureStore for MemoryFixtureStore {
	async fn drop_all(&self) -> FixtureResult<()> {
		self.collections.write().clear();
		Ok(())
	}

	async fn drop_collection(&self, name: &str) -> FixtureResult<()> {
		self.collections.write().remove(name);
		Ok(())
	}

	async fn bulk_insert(&self, collection: &str, documents: Vec<Document>) -> FixtureResult<()> {
		if documents.is_empty() {
			return Ok(());
		}

		self.collections
			.write()
			.entry(collection.to_string())
			.or_default()
			.extend(documents);
		Ok(())
	}

	async fn teardown(&self) -> FixtureResult<()> {
		self.collections.write().clear();
		self.torn_down.store(true, Ordering::SeqCst);
		Ok(())
	}
}
