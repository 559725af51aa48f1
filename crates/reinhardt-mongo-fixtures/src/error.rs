//! Error types for fixture loading.
//!
//! Every operation in this crate is fail-fast: the first error aborts the
//! rest of the pipeline and is returned to the caller unchanged.

use thiserror::Error;

/// Errors that can occur while parsing, importing or loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// The MongoDB server could not be reached or the URI was rejected.
	#[error("Connection error: {0}")]
	Connection(String),

	/// A drop or insert operation failed on the store.
	#[error("Store error: {0}")]
	Store(String),

	/// The fixture file extension is not a recognized format.
	#[error("Unsupported fixture format: {0}")]
	UnsupportedFixtureFormat(String),

	/// The contents of a fixture file could not be decoded.
	#[error("Failed to parse fixture {source_name}: {source}")]
	FixtureParse {
		/// File path or label of the fixture that failed.
		source_name: String,
		/// Underlying decode failure.
		#[source]
		source: DecodeError,
	},

	/// A value in the initial identifier mapping is not a valid ObjectId.
	#[error("Invalid identifier for '{name}': {value:?} is not a 24 character hex ObjectId")]
	InvalidIdentifierFormat {
		/// Symbolic name the value was supplied for.
		name: String,
		/// Supplied value.
		value: String,
	},

	/// The fixture source is neither a file, a directory nor an in-memory set.
	#[error("Invalid fixture source: {0}")]
	InvalidFixtureSource(String),

	/// I/O operation failed while reading fixtures.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Reasons a fixture document could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// JSON deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// YAML deserialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),

	/// The document decoded but does not have the expected structure.
	#[error("{0}")]
	InvalidShape(String),

	/// Two directory entries map to the same collection name.
	#[error("Ambiguous collection name '{0}': more than one file has this stem")]
	DuplicateCollection(String),
}

impl FixtureError {
	/// Builds a [`FixtureError::FixtureParse`] for the given source.
	pub fn parse(source_name: impl Into<String>, source: impl Into<DecodeError>) -> Self {
		Self::FixtureParse {
			source_name: source_name.into(),
			source: source.into(),
		}
	}
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
