//! Fixture file formats.

use std::path::Path;

/// Supported fixture file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FixtureFormat {
	/// JSON format (default).
	#[default]
	Json,

	/// YAML format (requires `yaml` feature).
	Yaml,
}

impl FixtureFormat {
	/// Determines the fixture format from a file extension.
	///
	/// # Example
	///
	/// ```
	/// # use reinhardt_fixtures::fixtures::FixtureFormat;
	/// assert_eq!(FixtureFormat::from_extension("json"), Some(FixtureFormat::Json));
	/// assert_eq!(FixtureFormat::from_extension("yml"), Some(FixtureFormat::Yaml));
	/// assert_eq!(FixtureFormat::from_extension("js"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Determines the fixture format from a file path.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Self::from_extension)
	}

	/// Returns true if this build can parse the format.
	pub fn is_enabled(&self) -> bool {
		match self {
			Self::Json => true,
			Self::Yaml => cfg!(feature = "yaml"),
		}
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json => write!(f, "JSON"),
			Self::Yaml => write!(f, "YAML"),
		}
	}
}

/// Normalizes a model name the way fixture file names are interpreted.
///
/// ```
/// # use reinhardt_fixtures::fixtures::normalize_model_name;
/// assert_eq!(normalize_model_name("BlogPost"), "blogpost");
/// ```
pub fn normalize_model_name(name: &str) -> String {
	name.trim().to_lowercase()
}

/// Derives the model name from a fixture file path.
///
/// The name is the part of the file name before the first `.`, lower-cased,
/// so `Author.json` and `author.seed.json` both describe `author`.
///
/// ```
/// # use reinhardt_fixtures::fixtures::model_name_from_path;
/// # use std::path::Path;
/// assert_eq!(model_name_from_path(Path::new("fixtures/Author.json")), Some("author".to_string()));
/// assert_eq!(model_name_from_path(Path::new("author.seed.yaml")), Some("author".to_string()));
/// ```
pub fn model_name_from_path(path: &Path) -> Option<String> {
	let file_name = path.file_name()?.to_str()?;
	let stem = file_name.split('.').next()?;
	if stem.is_empty() {
		return None;
	}
	Some(normalize_model_name(stem))
}
