//! Connection settings for fixture sessions.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the MongoDB connection string.
pub const URL_ENV: &str = "REINHARDT_FIXTURES_MONGODB_URL";

/// Environment variable overriding the target database name.
pub const DATABASE_ENV: &str = "REINHARDT_FIXTURES_DATABASE";

/// Default MongoDB connection string.
pub const DEFAULT_URL: &str = "mongodb://localhost:27017";

/// Database used when neither the settings nor the URI name one.
pub const DEFAULT_DATABASE: &str = "test";

/// Where fixtures are loaded.
///
/// # Example
///
/// ```
/// # use reinhardt_mongo_fixtures::config::FixtureSettings;
/// let settings = FixtureSettings::new("mongodb://db:27017").with_database("app_test");
/// assert_eq!(settings.database.as_deref(), Some("app_test"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
	/// MongoDB connection string.
	pub url: String,

	/// Target database. When `None`, the database named in the connection
	/// string is used, falling back to [`DEFAULT_DATABASE`].
	pub database: Option<String>,
}

impl Default for FixtureSettings {
	fn default() -> Self {
		Self {
			url: DEFAULT_URL.to_string(),
			database: None,
		}
	}
}

impl FixtureSettings {
	/// Creates settings for the given connection string.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			database: None,
		}
	}

	/// Sets the target database.
	pub fn with_database(mut self, database: impl Into<String>) -> Self {
		self.database = Some(database.into());
		self
	}

	/// Builds settings from the defaults overridden by
	/// `REINHARDT_FIXTURES_MONGODB_URL` and `REINHARDT_FIXTURES_DATABASE`.
	///
	/// Empty variables are ignored.
	pub fn from_env() -> Self {
		let mut settings = Self::default();

		if let Some(url) = read_env(URL_ENV) {
			settings.url = url;
		}
		if let Some(database) = read_env(DATABASE_ENV) {
			settings.database = Some(database);
		}

		settings
	}
}

fn read_env(key: &str) -> Option<String> {
	std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;

	fn clear_env() {
		// SAFETY: tests touching these variables run serially.
		unsafe {
			std::env::remove_var(URL_ENV);
			std::env::remove_var(DATABASE_ENV);
		}
	}

	#[rstest]
	fn test_default_settings() {
		let settings = FixtureSettings::default();
		assert_eq!(settings.url, "mongodb://localhost:27017");
		assert_eq!(settings.database, None);
	}

	#[rstest]
	#[serial(fixture_env)]
	fn test_from_env_without_variables() {
		clear_env();

		assert_eq!(FixtureSettings::from_env(), FixtureSettings::default());
	}

	#[rstest]
	#[serial(fixture_env)]
	fn test_from_env_overrides() {
		clear_env();
		// SAFETY: serialized with the other environment tests.
		unsafe {
			std::env::set_var(URL_ENV, "mongodb://fixtures-host:27018");
			std::env::set_var(DATABASE_ENV, "fixtures_db");
		}

		let settings = FixtureSettings::from_env();
		clear_env();

		assert_eq!(settings.url, "mongodb://fixtures-host:27018");
		assert_eq!(settings.database.as_deref(), Some("fixtures_db"));
	}

	#[rstest]
	#[serial(fixture_env)]
	fn test_from_env_ignores_blank_values() {
		clear_env();
		// SAFETY: serialized with the other environment tests.
		unsafe {
			std::env::set_var(DATABASE_ENV, "  ");
		}

		let settings = FixtureSettings::from_env();
		clear_env();

		assert_eq!(settings.database, None);
	}

	#[rstest]
	fn test_deserialize_with_defaults() {
		let settings: FixtureSettings =
			serde_json::from_str(r#"{"database": "from_file"}"#).unwrap();

		assert_eq!(settings.url, DEFAULT_URL);
		assert_eq!(settings.database.as_deref(), Some("from_file"));
	}
}
