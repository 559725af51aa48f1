//! Fixture sessions.
//!
//! A session owns a store, the identifier registry and the active fixtures.
//! Opening it clears the database and loads the fixtures; [`reset`] reloads
//! them between test cases and [`close`] tears everything down.
//!
//! [`reset`]: FixtureSession::reset
//! [`close`]: FixtureSession::close

use std::path::PathBuf;

use futures::future::try_join_all;

use crate::config::FixtureSettings;
use crate::error::FixtureResult;
use crate::fixtures::{
	FixtureImporter, FixtureParser, FixtureSet, FixtureSource, IdMap, IdentifierRegistry,
	MaterializedFixtureSet,
};
use crate::store::{FixtureStore, MongoFixtureStore};

/// A loaded set of fixtures bound to a store.
///
/// # Example
///
/// ```rust,no_run
/// use reinhardt_mongo_fixtures::FixtureSessionBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = FixtureSessionBuilder::new()
///     .url("mongodb://localhost:27017/app_test")
///     .path("tests/fixtures")
///     .connect()
///     .await?;
///
/// let alice = session.id_map().get("alice");
/// // ... run a test ...
/// session.reset(None).await?;
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FixtureSession<S: FixtureStore = MongoFixtureStore> {
	store: S,
	registry: IdentifierRegistry,
	importer: FixtureImporter,
}

impl<S: FixtureStore> FixtureSession<S> {
	/// Imports `fixtures`, drops every collection of the store and loads the
	/// materialized documents.
	///
	/// On failure the store is shut down before the error is returned.
	pub async fn open(
		store: S,
		registry: IdentifierRegistry,
		fixtures: FixtureSet,
	) -> FixtureResult<Self> {
		let mut importer = FixtureImporter::new();
		importer.import(&fixtures, &registry);

		let session = Self {
			store,
			registry,
			importer,
		};
		if let Err(e) = session.clear_and_load().await {
			tracing::debug!(error = %e, "Fixture session failed to open");
			session.store.shutdown().await;
			return Err(e);
		}

		tracing::info!(
			collections = fixtures.len(),
			records = fixtures.record_count(),
			identifiers = session.registry.len(),
			"Fixture session opened"
		);
		Ok(session)
	}

	/// Reloads fixtures.
	///
	/// When `fixtures` is given it is imported with this session's registry
	/// and replaces the active set. Every collection of the active set is
	/// dropped, and only once all drops have finished are the documents
	/// inserted again.
	pub async fn reset(&mut self, fixtures: Option<FixtureSet>) -> FixtureResult<()> {
		if let Some(fixtures) = fixtures {
			self.importer.import(&fixtures, &self.registry);
		}

		self.load_active().await?;

		tracing::info!(
			collections = self.importer.active().map_or(0, MaterializedFixtureSet::len),
			"Fixtures reset"
		);
		Ok(())
	}

	/// Tears the store down, ending the session.
	pub async fn close(self) -> FixtureResult<()> {
		self.store.teardown().await?;
		tracing::info!("Fixture session closed");
		Ok(())
	}

	/// Returns a live view of the identifier registry.
	pub fn id_map(&self) -> IdMap {
		self.registry.snapshot()
	}

	/// Returns the identifier registry.
	pub fn registry(&self) -> &IdentifierRegistry {
		&self.registry
	}

	/// Returns the fixtures currently loaded.
	pub fn fixtures(&self) -> Option<&MaterializedFixtureSet> {
		self.importer.active()
	}

	/// Returns the underlying store.
	pub fn store(&self) -> &S {
		&self.store
	}

	async fn clear_and_load(&self) -> FixtureResult<()> {
		self.store.drop_all().await?;
		self.load_active().await
	}

	async fn load_active(&self) -> FixtureResult<()> {
		let Some(active) = self.importer.active() else {
			return Ok(());
		};

		try_join_all(
			active
				.collection_names()
				.map(|collection| self.store.drop_collection(collection)),
		)
		.await?;

		try_join_all(active.iter().map(|(collection, documents)| {
			tracing::debug!(collection, count = documents.len(), "Loading fixture collection");
			self.store.bulk_insert(collection, documents.to_vec())
		}))
		.await?;

		Ok(())
	}
}

/// Builder for fixture sessions.
///
/// # Example
///
/// ```rust,no_run
/// use reinhardt_mongo_fixtures::FixtureSessionBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = FixtureSessionBuilder::from_env()
///     .database("app_test")
///     .id("admin", "64b7f0c2a1d3e4f5a6b7c8d9")
///     .path("tests/fixtures/users.json")
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FixtureSessionBuilder {
	settings: FixtureSettings,
	initial_mapping: Vec<(String, String)>,
	source: Option<FixtureSource>,
}

impl FixtureSessionBuilder {
	/// Creates a builder with default settings and no fixtures.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder whose settings come from the environment.
	///
	/// See [`FixtureSettings::from_env`].
	pub fn from_env() -> Self {
		Self::new().settings(FixtureSettings::from_env())
	}

	/// Replaces the connection settings.
	pub fn settings(mut self, settings: FixtureSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets the MongoDB connection string.
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.settings.url = url.into();
		self
	}

	/// Sets the target database.
	pub fn database(mut self, database: impl Into<String>) -> Self {
		self.settings.database = Some(database.into());
		self
	}

	/// Pre-binds a symbolic name to a known ObjectId hex string.
	pub fn id(mut self, name: impl Into<String>, hex: impl Into<String>) -> Self {
		self.initial_mapping.push((name.into(), hex.into()));
		self
	}

	/// Pre-binds several symbolic names.
	pub fn initial_mapping<I, K, V>(mut self, mapping: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.initial_mapping
			.extend(mapping.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	/// Loads fixtures from a file or directory, classified when the session
	/// is built.
	pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
		self.source = Some(FixtureSource::Path(path.into()));
		self
	}

	/// Loads fixtures from an explicit source.
	pub fn source(mut self, source: impl Into<FixtureSource>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Returns the connection settings.
	pub fn get_settings(&self) -> &FixtureSettings {
		&self.settings
	}

	/// Parses the fixtures, connects to MongoDB and opens the session.
	///
	/// Identifier and fixture errors are reported before any connection is
	/// attempted.
	pub async fn connect(self) -> FixtureResult<FixtureSession<MongoFixtureStore>> {
		let settings = self.settings.clone();
		let (registry, fixtures) = self.prepare().await?;
		let store = MongoFixtureStore::connect_with(&settings).await?;
		FixtureSession::open(store, registry, fixtures).await
	}

	/// Parses the fixtures and opens a session on the given store.
	pub async fn open_with<S: FixtureStore>(self, store: S) -> FixtureResult<FixtureSession<S>> {
		let (registry, fixtures) = self.prepare().await?;
		FixtureSession::open(store, registry, fixtures).await
	}

	async fn prepare(self) -> FixtureResult<(IdentifierRegistry, FixtureSet)> {
		let registry = IdentifierRegistry::with_seed(self.initial_mapping)?;

		let source = self
			.source
			.unwrap_or_else(|| FixtureSource::InMemory(FixtureSet::new()));
		let fixtures = FixtureParser::new().parse(source).await?;

		Ok((registry, fixtures))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::FixtureError;
	use crate::store::MemoryFixtureStore;
	use async_trait::async_trait;
	use bson::{Bson, Document, doc};
	use parking_lot::Mutex;
	use rstest::rstest;
	use serde_json::json;
	use std::sync::Arc;

	fn fixture_set(value: serde_json::Value) -> FixtureSet {
		FixtureSet::from_value(value).unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_open_clears_store_and_loads() {
		let store = MemoryFixtureStore::new();
		store
			.bulk_insert("stale", vec![doc! { "old": true }])
			.await
			.unwrap();

		let session = FixtureSession::open(
			store.clone(),
			IdentifierRegistry::new(),
			fixture_set(json!({
				"users": [{"_id": "__bob__", "name": "Bob"}],
				"orders": [{"user": "__bob__"}],
			})),
		)
		.await
		.unwrap();

		assert_eq!(store.collection_names(), vec!["orders", "users"]);
		let bob = session.id_map().get("bob").unwrap();
		assert_eq!(
			store.collection("orders").unwrap()[0].get("user"),
			Some(&Bson::ObjectId(bob))
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_reset_restores_active_fixtures() {
		let store = MemoryFixtureStore::new();
		let mut session = FixtureSession::open(
			store.clone(),
			IdentifierRegistry::new(),
			fixture_set(json!({"users": [{"name": "Bob"}]})),
		)
		.await
		.unwrap();

		store
			.bulk_insert("users", vec![doc! { "name": "Added by a test" }])
			.await
			.unwrap();
		assert_eq!(store.collection("users").unwrap().len(), 2);

		session.reset(None).await.unwrap();

		let users = store.collection("users").unwrap();
		assert_eq!(users.len(), 1);
		assert_eq!(users[0].get_str("name").unwrap(), "Bob");
	}

	#[rstest]
	#[tokio::test]
	async fn test_reset_with_new_fixtures_shares_registry() {
		let store = MemoryFixtureStore::new();
		let mut session = FixtureSession::open(
			store.clone(),
			IdentifierRegistry::new(),
			fixture_set(json!({"users": [{"_id": "__bob__"}]})),
		)
		.await
		.unwrap();
		let bob = session.id_map().get("bob").unwrap();

		session
			.reset(Some(fixture_set(json!({"never_created": [{"owner": "___bob___"}]}))))
			.await
			.unwrap();

		let docs = store.collection("never_created").unwrap();
		assert_eq!(docs[0].get_str("owner").unwrap(), bob.to_hex());
		assert!(session.fixtures().unwrap().documents("users").is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_close_tears_down() {
		let store = MemoryFixtureStore::new();
		let session =
			FixtureSession::open(store.clone(), IdentifierRegistry::new(), FixtureSet::new())
				.await
				.unwrap();

		session.close().await.unwrap();

		assert!(store.is_torn_down());
	}

	#[derive(Default)]
	struct RecordingStore {
		events: Arc<Mutex<Vec<String>>>,
		fail_drop: Option<String>,
	}

	#[async_trait]
	impl FixtureStore for RecordingStore {
		async fn drop_all(&self) -> FixtureResult<()> {
			self.events.lock().push("drop_all".to_string());
			Ok(())
		}

		async fn drop_collection(&self, name: &str) -> FixtureResult<()> {
			tokio::task::yield_now().await;
			if self.fail_drop.as_deref() == Some(name) {
				return Err(FixtureError::Store(format!("cannot drop {}", name)));
			}
			self.events.lock().push(format!("drop:{}", name));
			Ok(())
		}

		async fn bulk_insert(
			&self,
			collection: &str,
			_documents: Vec<Document>,
		) -> FixtureResult<()> {
			self.events.lock().push(format!("insert:{}", collection));
			Ok(())
		}

		async fn teardown(&self) -> FixtureResult<()> {
			self.events.lock().push("teardown".to_string());
			Ok(())
		}

		async fn shutdown(&self) {
			self.events.lock().push("shutdown".to_string());
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_all_drops_finish_before_inserts() {
		let store = RecordingStore::default();
		let events = Arc::clone(&store.events);

		FixtureSession::open(
			store,
			IdentifierRegistry::new(),
			fixture_set(json!({"a": [{}], "b": [{}], "c": [{}]})),
		)
		.await
		.unwrap();

		let events = events.lock().clone();
		assert_eq!(events[0], "drop_all");
		let last_drop = events.iter().rposition(|e| e.starts_with("drop:")).unwrap();
		let first_insert = events.iter().position(|e| e.starts_with("insert:")).unwrap();
		assert!(last_drop < first_insert, "events out of order: {:?}", events);
		assert_eq!(events.iter().filter(|e| e.starts_with("insert:")).count(), 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_drop_failure_aborts_before_inserts() {
		let store = RecordingStore {
			fail_drop: Some("b".to_string()),
			..Default::default()
		};
		let events = Arc::clone(&store.events);

		let result = FixtureSession::open(
			store,
			IdentifierRegistry::new(),
			fixture_set(json!({"a": [{}], "b": [{}]})),
		)
		.await;

		assert!(matches!(result, Err(FixtureError::Store(ref m)) if m == "cannot drop b"));
		let events = events.lock();
		assert!(!events.iter().any(|e| e.starts_with("insert:")));
		assert_eq!(events.last().map(String::as_str), Some("shutdown"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_successful_open_keeps_store_running() {
		let store = RecordingStore::default();
		let events = Arc::clone(&store.events);

		let session = FixtureSession::open(
			store,
			IdentifierRegistry::new(),
			fixture_set(json!({"a": [{}]})),
		)
		.await
		.unwrap();

		assert!(!events.lock().iter().any(|e| e == "shutdown"));
		session.close().await.unwrap();
		assert_eq!(events.lock().last().map(String::as_str), Some("teardown"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_builder_seeds_registry() {
		let hex = "64b7f0c2a1d3e4f5a6b7c8d9";
		let store = MemoryFixtureStore::new();

		let session = FixtureSessionBuilder::new()
			.id("alice", hex)
			.source(fixture_set(json!({"users": [{"_id": "__alice__"}]})))
			.open_with(store.clone())
			.await
			.unwrap();

		assert_eq!(session.id_map().get_hex("alice").as_deref(), Some(hex));
		assert_eq!(
			store.collection("users").unwrap()[0]
				.get_object_id("_id")
				.unwrap()
				.to_hex(),
			hex
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_builder_rejects_bad_seed_before_touching_store() {
		let store = MemoryFixtureStore::new();
		store
			.bulk_insert("existing", vec![doc! { "keep": true }])
			.await
			.unwrap();

		let result = FixtureSessionBuilder::new()
			.initial_mapping([("alice", "nope")])
			.open_with(store.clone())
			.await;

		assert!(matches!(
			result,
			Err(FixtureError::InvalidIdentifierFormat { .. })
		));
		assert_eq!(store.collection_names(), vec!["existing"]);
	}

	#[rstest]
	fn test_builder_settings() {
		let builder = FixtureSessionBuilder::new()
			.url("mongodb://example.com:27017")
			.database("fixtures_db");

		assert_eq!(builder.get_settings().url, "mongodb://example.com:27017");
		assert_eq!(builder.get_settings().database.as_deref(), Some("fixtures_db"));
	}
}
