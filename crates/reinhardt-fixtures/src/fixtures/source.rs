//! Fixture sources.

use std::path::{Path, PathBuf};

use super::{FixtureFormat, FixtureParser, FixtureSet};
use crate::error::{SeedingError, SeedingResult};

/// Default fixture directory, relative to the working directory.
pub const DEFAULT_FIXTURE_DIR: &str = "test/fixtures";

/// Anything that can produce the fixtures of a seeding run.
pub trait FixtureSource {
	/// Loads every fixture collection the source knows about.
	fn load_all(&self) -> SeedingResult<FixtureSet>;
}

impl FixtureSource for FixtureSet {
	fn load_all(&self) -> SeedingResult<FixtureSet> {
		Ok(self.clone())
	}
}

/// Reads one fixture file per model from a directory.
///
/// Files are visited in lexical order of their names, which becomes the
/// default seeding order. Files without a recognized extension are skipped.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	path: PathBuf,
}

impl DirectorySource {
	/// Reads fixtures from `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Reads fixtures from `<current dir>/test/fixtures`.
	pub fn from_current_dir() -> SeedingResult<Self> {
		Ok(Self::new(std::env::current_dir()?.join(DEFAULT_FIXTURE_DIR)))
	}

	/// Directory being read.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn fixture_files(&self) -> SeedingResult<Vec<PathBuf>> {
		let entries = std::fs::read_dir(&self.path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedingError::FileNotFound(self.path.display().to_string())
			} else {
				SeedingError::IoError(e)
			}
		})?;

		let mut files = Vec::new();
		for entry in entries {
			let path = entry?.path();
			if !path.is_file() {
				continue;
			}
			match FixtureFormat::from_path(&path) {
				Some(format) if format.is_enabled() => files.push(path),
				Some(format) => {
					tracing::warn!(
						file = %path.display(),
						"Skipping {} fixture: format support is not enabled",
						format
					);
				}
				None => {
					tracing::debug!(file = %path.display(), "Skipping non-fixture file");
				}
			}
		}
		files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
		Ok(files)
	}
}

impl FixtureSource for DirectorySource {
	fn load_all(&self) -> SeedingResult<FixtureSet> {
		let parser = FixtureParser::new();
		let mut fixtures = FixtureSet::new();

		for path in self.fixture_files()? {
			let collection = parser.parse_file(&path)?;
			let model = collection.model().to_string();
			if let Some(previous) = fixtures.insert(collection) {
				return Err(SeedingError::validation(
					model,
					format!(
						"defined twice: {} and {}",
						previous.source().unwrap_or("(memory)"),
						path.display()
					),
				));
			}
			tracing::debug!(model = %model, file = %path.display(), "Loaded fixtures");
		}

		tracing::info!(
			models = fixtures.len(),
			dir = %self.path.display(),
			"Loaded fixture directory"
		);
		Ok(fixtures)
	}
}
