//! Test data loader helper.
//!
//! Provides access to the fixture directories under tests/fixtures/data.

use std::path::{Path, PathBuf};

use reinhardt_fixtures::DirectorySource;

/// Locates fixture directories used by the integration tests.
pub struct TestDataLoader {
	base_path: PathBuf,
}

impl TestDataLoader {
	/// Create a new test data loader rooted at this crate's
	/// tests/fixtures/data directory.
	pub fn new() -> Self {
		Self::with_base(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data"))
	}

	/// Create a test data loader with a custom base path.
	pub fn with_base<P: AsRef<Path>>(base_path: P) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
		}
	}

	/// Full path to a fixture directory.
	pub fn path(&self, name: &str) -> PathBuf {
		self.base_path.join(name)
	}

	/// Directory source for a fixture directory.
	pub fn source(&self, name: &str) -> DirectorySource {
		DirectorySource::new(self.path(name))
	}
}

impl Default for TestDataLoader {
	fn default() -> Self {
		Self::new()
	}
}
