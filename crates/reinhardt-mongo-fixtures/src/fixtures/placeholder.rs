//! Placeholder references in fixture values.
//!
//! A string field value wrapped in double underscores (`__alice__`) stands
//! for the ObjectId registered under `alice`. Wrapped in triple underscores
//! (`___alice___`) it stands for the hex string form of that same id.
//!
//! The triple form always also matches the double pattern (with the name
//! `_alice_`), so it must be tested first.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static HEX_STRING_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^___([^\r\n\x{2028}\x{2029}]*)___$").expect("valid placeholder pattern")
});

static OBJECT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^__([^\r\n\x{2028}\x{2029}]*)__$").expect("valid placeholder pattern")
});

/// What a placeholder resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
	/// `__name__`: the native ObjectId.
	ObjectId,
	/// `___name___`: the 24 character hex string of the ObjectId.
	HexString,
}

/// A parsed placeholder reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
	/// Form the resolved identifier takes.
	pub kind: PlaceholderKind,
	/// Symbolic name looked up in the registry.
	pub name: &'a str,
}

impl<'a> Placeholder<'a> {
	/// Parses a placeholder from text.
	///
	/// # Example
	///
	/// ```
	/// # use reinhardt_mongo_fixtures::fixtures::{Placeholder, PlaceholderKind};
	/// let p = Placeholder::parse("___alice___").unwrap();
	/// assert_eq!(p.kind, PlaceholderKind::HexString);
	/// assert_eq!(p.name, "alice");
	///
	/// let p = Placeholder::parse("__alice__").unwrap();
	/// assert_eq!(p.kind, PlaceholderKind::ObjectId);
	///
	/// assert!(Placeholder::parse("alice").is_none());
	/// ```
	pub fn parse(text: &'a str) -> Option<Self> {
		if let Some(caps) = HEX_STRING_PATTERN.captures(text) {
			return caps.get(1).map(|m| Self {
				kind: PlaceholderKind::HexString,
				name: m.as_str(),
			});
		}

		OBJECT_ID_PATTERN.captures(text).and_then(|caps| {
			caps.get(1).map(|m| Self {
				kind: PlaceholderKind::ObjectId,
				name: m.as_str(),
			})
		})
	}
}

/// A fixture field value after classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
	/// Anything that is copied as-is.
	Scalar(&'a Value),
	/// A string that references a registry identifier.
	Placeholder(Placeholder<'a>),
}

impl<'a> FieldValue<'a> {
	/// Classifies a raw field value.
	///
	/// Only top-level strings are inspected; nested arrays and objects are
	/// scalars.
	pub fn classify(value: &'a Value) -> Self {
		match value {
			Value::String(text) => Placeholder::parse(text)
				.map(Self::Placeholder)
				.unwrap_or(Self::Scalar(value)),
			_ => Self::Scalar(value),
		}
	}
}
