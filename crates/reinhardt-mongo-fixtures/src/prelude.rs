//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use reinhardt_mongo_fixtures::prelude::*;
//! ```

// Error types
pub use crate::error::{DecodeError, FixtureError, FixtureResult};

// Fixture types
pub use crate::fixtures::{
	FixtureFormat, FixtureImporter, FixtureParser, FixtureSet, FixtureSource, IdMap,
	IdentifierRegistry, MaterializedFixtureSet, Placeholder, PlaceholderKind,
};

// Sessions and stores
pub use crate::config::FixtureSettings;
pub use crate::session::{FixtureSession, FixtureSessionBuilder};
pub use crate::store::{FixtureStore, MemoryFixtureStore, MongoFixtureStore};
