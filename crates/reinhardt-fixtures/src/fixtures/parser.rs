//! Fixture parsing functionality.
//!
//! A fixture file holds the records of exactly one model as a JSON (or YAML)
//! sequence of mappings. The model is named after the file.

use std::path::Path;

use serde_json::Value;

use super::{FixtureCollection, FixtureFormat, model_name_from_path};
use crate::error::{SeedingError, SeedingResult};

/// Parser for fixture files.
#[derive(Debug, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a fixture file from the given path.
	///
	/// The format is detected from the file extension and the model name
	/// from the file name.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file cannot be read
	/// - The file extension is not recognized
	/// - The file content is not a sequence of mappings
	pub fn parse_file(&self, path: &Path) -> SeedingResult<FixtureCollection> {
		let format = FixtureFormat::from_path(path).ok_or_else(|| {
			SeedingError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			)
		})?;

		let model = model_name_from_path(path)
			.ok_or_else(|| SeedingError::ParseError(format!("No model name in {}", path.display())))?;

		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedingError::FileNotFound(path.display().to_string())
			} else {
				SeedingError::IoError(e)
			}
		})?;

		Ok(self
			.parse_string(&model, &content, format)?
			.with_source(path.display().to_string()))
	}

	/// Parses the fixtures of `model` from a string.
	pub fn parse_string(
		&self,
		model: &str,
		content: &str,
		format: FixtureFormat,
	) -> SeedingResult<FixtureCollection> {
		let value = match format {
			FixtureFormat::Json => serde_json::from_str(content)?,
			FixtureFormat::Yaml => self.parse_yaml(content)?,
		};
		self.collect_records(model, value)
	}

	#[cfg(feature = "yaml")]
	fn parse_yaml(&self, content: &str) -> SeedingResult<Value> {
		Ok(serde_yaml::from_str(content)?)
	}

	#[cfg(not(feature = "yaml"))]
	fn parse_yaml(&self, _content: &str) -> SeedingResult<Value> {
		Err(SeedingError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	/// Checks the document shape: a sequence whose items are all mappings.
	fn collect_records(&self, model: &str, value: Value) -> SeedingResult<FixtureCollection> {
		let Value::Array(items) = value else {
			return Err(SeedingError::validation(
				model,
				"fixture file must contain a list of records",
			));
		};
		FixtureCollection::from_values(model, items)
	}
}
