//! Test helpers for reinhardt-mongo-fixtures tests.
//!
//! This module provides utilities for writing fixture files into
//! temporary directories.

#[path = "helpers/test_data.rs"]
pub mod test_data;
