//! Fixture parsing and placeholder resolution.
//!
//! - [`FixtureParser`] reads a [`FixtureSource`] into a raw [`FixtureSet`]
//! - [`FixtureImporter`] resolves placeholders into a [`MaterializedFixtureSet`]
//! - [`IdentifierRegistry`] holds the symbolic name to ObjectId table

mod format;
mod importer;
mod parser;
mod placeholder;
mod registry;

pub use format::{FixtureFormat, FixtureSet, MaterializedFixtureSet, Record, json_to_bson};
pub use importer::FixtureImporter;
pub use parser::{FixtureParser, FixtureSource};
pub use placeholder::{FieldValue, Placeholder, PlaceholderKind};
pub use registry::{IdMap, IdentifierRegistry};
