//! Fixture parsing functionality.
//!
//! This module turns a [`FixtureSource`] into a raw [`FixtureSet`]. Files are
//! decoded as JSON or YAML depending on their extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use serde_json::Value;

use super::format::records_from_value;
use super::{FixtureFormat, FixtureSet, Record};
use crate::error::{DecodeError, FixtureError, FixtureResult};

/// Where fixtures come from.
///
/// A path given as a string or [`PathBuf`] becomes [`FixtureSource::Path`]
/// and is classified as a file or directory when it is parsed.
#[derive(Debug, Clone)]
pub enum FixtureSource {
	/// A filesystem path that is either a fixture file or a directory.
	Path(PathBuf),
	/// A single file holding a mapping of collection names to records.
	File(PathBuf),
	/// A directory where every file holds the records of one collection,
	/// named after the file stem.
	Directory(PathBuf),
	/// Fixtures already in memory.
	InMemory(FixtureSet),
}

impl FixtureSource {
	/// Classifies a filesystem path as a file or directory source.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::InvalidFixtureSource`] when the path cannot
	/// be inspected or is neither a regular file nor a directory.
	pub async fn from_path(path: impl AsRef<Path>) -> FixtureResult<Self> {
		let path = path.as_ref();
		match PathKind::of(path).await? {
			PathKind::File => Ok(Self::File(path.to_path_buf())),
			PathKind::Directory => Ok(Self::Directory(path.to_path_buf())),
		}
	}
}

impl From<FixtureSet> for FixtureSource {
	fn from(set: FixtureSet) -> Self {
		Self::InMemory(set)
	}
}

impl From<PathBuf> for FixtureSource {
	fn from(path: PathBuf) -> Self {
		Self::Path(path)
	}
}

impl From<&Path> for FixtureSource {
	fn from(path: &Path) -> Self {
		Self::Path(path.to_path_buf())
	}
}

impl From<&str> for FixtureSource {
	fn from(path: &str) -> Self {
		Self::Path(PathBuf::from(path))
	}
}

impl From<String> for FixtureSource {
	fn from(path: String) -> Self {
		Self::Path(PathBuf::from(path))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
	File,
	Directory,
}

impl PathKind {
	async fn of(path: &Path) -> FixtureResult<Self> {
		let metadata = tokio::fs::metadata(path).await.map_err(|e| {
			FixtureError::InvalidFixtureSource(format!("{}: {}", path.display(), e))
		})?;

		if metadata.is_dir() {
			Ok(Self::Directory)
		} else if metadata.is_file() {
			Ok(Self::File)
		} else {
			Err(FixtureError::InvalidFixtureSource(format!(
				"{} is neither a file nor a directory",
				path.display()
			)))
		}
	}

	async fn expect(path: &Path, expected: Self) -> FixtureResult<()> {
		let actual = Self::of(path).await?;
		if actual == expected {
			return Ok(());
		}

		let wanted = match expected {
			Self::File => "a file",
			Self::Directory => "a directory",
		};
		Err(FixtureError::InvalidFixtureSource(format!(
			"{} is not {}",
			path.display(),
			wanted
		)))
	}
}

/// Parser for fixture sources.
///
/// Supports both JSON and YAML formats (YAML requires the `yaml` feature).
#[derive(Debug, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a fixture source into a raw fixture set.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - A path does not exist or is not of the expected kind
	/// - A file cannot be read
	/// - A file extension is not recognized
	/// - A file content is invalid
	/// - Two files in a directory share a collection name
	pub async fn parse(&self, source: FixtureSource) -> FixtureResult<FixtureSet> {
		match source {
			FixtureSource::Path(path) => self.parse_path(&path).await,
			FixtureSource::File(path) => self.parse_file(&path).await,
			FixtureSource::Directory(path) => self.parse_dir(&path).await,
			FixtureSource::InMemory(set) => Ok(set),
		}
	}

	/// Parses a filesystem path, dispatching on whether it is a file or a
	/// directory.
	pub async fn parse_path(&self, path: impl AsRef<Path>) -> FixtureResult<FixtureSet> {
		let path = path.as_ref();
		match PathKind::of(path).await? {
			PathKind::File => self.parse_file(path).await,
			PathKind::Directory => self.parse_dir(path).await,
		}
	}

	/// Parses a single file holding a whole fixture set.
	///
	/// The file must decode to a mapping of collection names to lists of
	/// records.
	pub async fn parse_file(&self, path: &Path) -> FixtureResult<FixtureSet> {
		PathKind::expect(path, PathKind::File).await?;

		let value = self.read_value(path).await?;
		let set = FixtureSet::from_value(value).map_err(|message| {
			FixtureError::parse(path.display().to_string(), DecodeError::InvalidShape(message))
		})?;

		tracing::debug!(
			path = %path.display(),
			collections = set.len(),
			records = set.record_count(),
			"Parsed fixture file"
		);
		Ok(set)
	}

	/// Parses a directory where each regular file is one collection.
	///
	/// Files are decoded concurrently; the first failure aborts the parse.
	/// Sub-directories are skipped.
	pub async fn parse_dir(&self, dir: &Path) -> FixtureResult<FixtureSet> {
		PathKind::expect(dir, PathKind::Directory).await?;

		let mut entries = tokio::fs::read_dir(dir).await?;
		let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();

		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			if !entry.file_type().await?.is_file() {
				continue;
			}

			let collection = collection_name(&path).ok_or_else(|| {
				FixtureError::InvalidFixtureSource(format!(
					"{} has no usable file name",
					path.display()
				))
			})?;

			if let Some(previous) = files.insert(collection.clone(), path.clone()) {
				tracing::debug!(
					first = %previous.display(),
					second = %path.display(),
					collection = %collection,
					"Two fixture files map to the same collection"
				);
				return Err(FixtureError::parse(
					dir.display().to_string(),
					DecodeError::DuplicateCollection(collection),
				));
			}
		}

		let parsed = try_join_all(files.into_iter().map(|(collection, path)| async move {
			let records = self.parse_collection_file(&path).await?;
			Ok::<_, FixtureError>((collection, records))
		}))
		.await?;

		Ok(parsed.into_iter().collect())
	}

	/// Decodes fixture text in the given format into a fixture set.
	pub fn parse_str(&self, content: &str, format: FixtureFormat) -> FixtureResult<FixtureSet> {
		let value = decode("<string>", content.as_bytes(), format)?;
		FixtureSet::from_value(value)
			.map_err(|message| FixtureError::parse("<string>", DecodeError::InvalidShape(message)))
	}

	async fn parse_collection_file(&self, path: &Path) -> FixtureResult<Vec<Record>> {
		let value = self.read_value(path).await?;
		let records = records_from_value(value).map_err(|message| {
			FixtureError::parse(path.display().to_string(), DecodeError::InvalidShape(message))
		})?;

		tracing::debug!(
			path = %path.display(),
			records = records.len(),
			"Parsed collection fixture file"
		);
		Ok(records)
	}

	async fn read_value(&self, path: &Path) -> FixtureResult<Value> {
		let format = FixtureFormat::from_path(path)
			.ok_or_else(|| FixtureError::UnsupportedFixtureFormat(path.display().to_string()))?;

		// Invalid UTF-8 is a decode error, not an I/O error.
		let content = tokio::fs::read(path).await?;
		decode(&path.display().to_string(), &content, format)
	}
}

fn collection_name(path: &Path) -> Option<String> {
	path.file_stem()
		.and_then(|stem| stem.to_str())
		.filter(|stem| !stem.is_empty())
		.map(str::to_string)
}

fn decode(source_name: &str, content: &[u8], format: FixtureFormat) -> FixtureResult<Value> {
	match format {
		FixtureFormat::Json => {
			serde_json::from_slice(content).map_err(|e| FixtureError::parse(source_name, e))
		}
		#[cfg(feature = "yaml")]
		FixtureFormat::Yaml => {
			serde_yaml::from_slice(content).map_err(|e| FixtureError::parse(source_name, e))
		}
		#[cfg(not(feature = "yaml"))]
		FixtureFormat::Yaml => Err(FixtureError::UnsupportedFixtureFormat(format!(
			"{}: YAML support requires the 'yaml' feature",
			source_name
		))),
	}
}
