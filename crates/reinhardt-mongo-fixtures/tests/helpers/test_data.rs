//! Fixture directory helper.
//!
//! Writes fixture files into a temporary directory that is removed when the
//! helper is dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory of fixture files.
pub struct FixtureDir {
	dir: TempDir,
}

impl FixtureDir {
	/// Create an empty fixture directory.
	pub fn new() -> Self {
		Self {
			dir: TempDir::new().expect("Failed to create temporary fixture directory"),
		}
	}

	/// Write a fixture file and return its path.
	///
	/// # Arguments
	///
	/// * `name` - File name including the extension
	/// * `content` - File contents
	///
	/// # Panics
	///
	/// Panics if the file cannot be written.
	pub fn write(&self, name: &str, content: &str) -> PathBuf {
		let path = self.dir.path().join(name);
		std::fs::write(&path, content)
			.unwrap_or_else(|_| panic!("Failed to write test fixture: {:?}", path));
		path
	}

	/// Add a fixture file using the builder pattern.
	pub fn with_file(self, name: &str, content: &str) -> Self {
		self.write(name, content);
		self
	}

	/// Path of the directory.
	pub fn path(&self) -> &Path {
		self.dir.path()
	}
}

impl Default for FixtureDir {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[rstest::rstest]
	fn test_fixture_dir_write() {
		let dir = FixtureDir::new();
		let path = dir.write("users.json", "[]");

		assert!(path.ends_with("users.json"));
		assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
	}

	#[rstest::rstest]
	fn test_fixture_dir_removed_on_drop() {
		let dir = FixtureDir::new().with_file("users.json", "[]");
		let path = dir.path().to_path_buf();

		drop(dir);

		assert!(!path.exists());
	}
}
