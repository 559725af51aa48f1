//! MongoDB test fixtures for the Reinhardt framework.
//!
//! This crate loads fixture data into a MongoDB database before integration
//! tests and resets it between them:
//!
//! - **Fixture files**: JSON or YAML, one file per fixture set or a directory
//!   with one file per collection
//! - **Symbolic ids**: `__name__` placeholders become stable ObjectIds shared
//!   across every collection, `___name___` becomes their hex string
//! - **Sessions**: open, reset and close the loaded data
//!
//! # Features
//!
//! - `yaml` - YAML fixture support (enabled by default)
//! - `testcontainers` - MongoDB integration tests backed by docker
//!
//! # Quick Start
//!
//! Create `tests/fixtures/users.json`:
//!
//! ```json
//! [
//!   { "_id": "__alice__", "name": "Alice" },
//!   { "_id": "__bob__", "name": "Bob", "manager": "__alice__" }
//! ]
//! ```
//!
//! and `tests/fixtures/orders.yml`:
//!
//! ```yaml
//! - user: __bob__
//!   user_hex: ___bob___
//!   total: 42
//! ```
//!
//! Load them:
//!
//! ```rust,no_run
//! use reinhardt_mongo_fixtures::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = reinhardt_mongo_fixtures::connect(
//!     "mongodb://localhost:27017/app_test",
//!     None,
//!     "tests/fixtures",
//! )
//! .await?;
//!
//! let bob = session.id_map().get("bob").unwrap();
//! // ... query for bob ...
//!
//! session.reset(None).await?;
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`FixtureParser`](fixtures::FixtureParser) - Read a [`FixtureSource`](fixtures::FixtureSource)
//! - [`FixtureImporter`](fixtures::FixtureImporter) - Resolve placeholders
//! - [`IdentifierRegistry`](fixtures::IdentifierRegistry) - Name to ObjectId table
//! - [`FixtureStore`](store::FixtureStore) - Target database operations
//! - [`FixtureSession`] - Open, reset and close loaded fixtures

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod fixtures;
pub mod prelude;
pub mod session;
pub mod store;

use std::collections::HashMap;

// Re-export commonly used types at crate root
pub use config::FixtureSettings;
pub use error::{DecodeError, FixtureError, FixtureResult};
pub use fixtures::{
	FixtureFormat, FixtureImporter, FixtureParser, FixtureSet, FixtureSource, IdMap,
	IdentifierRegistry, MaterializedFixtureSet,
};
pub use session::{FixtureSession, FixtureSessionBuilder};
pub use store::{FixtureStore, MemoryFixtureStore, MongoFixtureStore};

/// Loads fixtures into a MongoDB database and returns the open session.
///
/// `initial_mapping` pre-binds symbolic names to existing ObjectIds given
/// as hex strings. `source` may be a filesystem path, which is classified
/// as a file or directory, or an in-memory [`FixtureSet`]. The mapping and
/// the fixtures are validated before the connection is made.
///
/// # Errors
///
/// Fails with the first error of seeding, parsing, connecting, dropping or
/// inserting; nothing is returned partially.
pub async fn connect(
	connection_string: &str,
	initial_mapping: Option<HashMap<String, String>>,
	source: impl Into<FixtureSource>,
) -> FixtureResult<FixtureSession> {
	FixtureSessionBuilder::new()
		.url(connection_string)
		.initial_mapping(initial_mapping.unwrap_or_default())
		.source(source)
		.connect()
		.await
}
