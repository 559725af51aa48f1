//! MongoDB fixture store.
//!
//! # Example
//!
//! ```rust,no_run
//! use reinhardt_mongo_fixtures::store::{FixtureStore, MongoFixtureStore};
//! use bson::doc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoFixtureStore::connect("mongodb://localhost:27017/app_test").await?;
//!
//! store.drop_all().await?;
//! store.bulk_insert("users", vec![doc! { "name": "Alice" }]).await?;
//! store.teardown().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use super::FixtureStore;
use crate::config::{DEFAULT_DATABASE, FixtureSettings};
use crate::error::{FixtureError, FixtureResult};

/// Server error code for operations on a collection that does not exist.
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Fixture store backed by a MongoDB database.
#[derive(Clone, Debug)]
pub struct MongoFixtureStore {
	client: Client,
	database_name: String,
}

impl MongoFixtureStore {
	/// Connects using a connection string.
	///
	/// The database named in the connection string is used, or `"test"`
	/// when it names none.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::Connection`] if the string is invalid or the
	/// server does not answer a ping.
	pub async fn connect(url: &str) -> FixtureResult<Self> {
		Self::connect_with(&FixtureSettings::new(url)).await
	}

	/// Connects using explicit settings.
	pub async fn connect_with(settings: &FixtureSettings) -> FixtureResult<Self> {
		let options = ClientOptions::parse(&settings.url)
			.await
			.map_err(|e| FixtureError::Connection(e.to_string()))?;

		let database_name = settings
			.database
			.clone()
			.or_else(|| options.default_database.clone())
			.unwrap_or_else(|| DEFAULT_DATABASE.to_string());

		let client = Client::with_options(options)
			.map_err(|e| FixtureError::Connection(e.to_string()))?;

		let store = Self {
			client,
			database_name,
		};
		store.ping().await?;

		tracing::debug!(database = %store.database_name, "Connected fixture store");
		Ok(store)
	}

	/// Wraps an existing client.
	pub fn with_client(client: Client, database_name: impl Into<String>) -> Self {
		Self {
			client,
			database_name: database_name.into(),
		}
	}

	/// Returns the name of the target database.
	pub fn database_name(&self) -> &str {
		&self.database_name
	}

	/// Returns the target database handle.
	pub fn database(&self) -> Database {
		self.client.database(&self.database_name)
	}

	async fn ping(&self) -> FixtureResult<()> {
		self.database()
			.run_command(doc! { "ping": 1 })
			.await
			.map_err(|e| FixtureError::Connection(format!("Ping failed: {}", e)))?;
		Ok(())
	}
}

fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
	matches!(*err.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_NOT_FOUND)
}

#[async_trait]
impl FixtureStore for MongoFixtureStore {
	async fn drop_all(&self) -> FixtureResult<()> {
		self.database().drop().await.map_err(|e| {
			FixtureError::Store(format!(
				"Failed to drop database {}: {}",
				self.database_name, e
			))
		})
	}

	async fn drop_collection(&self, name: &str) -> FixtureResult<()> {
		match self.database().collection::<Document>(name).drop().await {
			Ok(()) => Ok(()),
			Err(e) if is_namespace_not_found(&e) => {
				tracing::debug!(collection = name, "Collection did not exist, nothing to drop");
				Ok(())
			}
			Err(e) => Err(FixtureError::Store(format!(
				"Failed to drop collection {}: {}",
				name, e
			))),
		}
	}

	async fn bulk_insert(&self, collection: &str, documents: Vec<Document>) -> FixtureResult<()> {
		if documents.is_empty() {
			return Ok(());
		}

		let count = documents.len();
		self.database()
			.collection::<Document>(collection)
			.insert_many(documents)
			.await
			.map_err(|e| {
				FixtureError::Store(format!("Failed to insert into {}: {}", collection, e))
			})?;

		tracing::debug!(collection, count, "Inserted fixture documents");
		Ok(())
	}

	async fn teardown(&self) -> FixtureResult<()> {
		let dropped = self.drop_all().await;
		self.shutdown().await;
		dropped
	}

	async fn shutdown(&self) {
		self.client.clone().shutdown().await;
		tracing::debug!(database = %self.database_name, "Fixture store client shut down");
	}
}
