//! Fixture stores.
//!
//! A [`FixtureStore`] is the database a fixture session clears and fills.
//! [`MongoFixtureStore`] talks to a MongoDB server; [`MemoryFixtureStore`]
//! keeps collections in memory for tests that don't need a server.

pub mod memory;
pub mod mongodb;

use async_trait::async_trait;
use bson::Document;

use crate::error::FixtureResult;

pub use self::memory::MemoryFixtureStore;
pub use self::mongodb::MongoFixtureStore;

/// Operations a fixture session needs from the target database.
///
/// # Example
///
/// ```rust,ignore
/// async fn reload(store: &dyn FixtureStore, docs: Vec<Document>) -> FixtureResult<()> {
///     store.drop_collection("users").await?;
///     store.bulk_insert("users", docs).await
/// }
/// ```
#[async_trait]
pub trait FixtureStore: Send + Sync {
	/// Drops every collection of the target database.
	async fn drop_all(&self) -> FixtureResult<()>;

	/// Drops a single collection.
	///
	/// Dropping a collection that does not exist succeeds.
	async fn drop_collection(&self, name: &str) -> FixtureResult<()>;

	/// Inserts documents into a collection. An empty list is a no-op.
	async fn bulk_insert(&self, collection: &str, documents: Vec<Document>) -> FixtureResult<()>;

	/// Removes the fixture data and releases the connection.
	///
	/// The connection is released even when removing the data fails.
	async fn teardown(&self) -> FixtureResult<()>;

	/// Releases the connection without touching the data.
	async fn shutdown(&self) {}
}
