//! seed command implementation.
//!
//! This command loads a fixture directory and seeds it into a store.

use std::path::PathBuf;

use crate::engine::{ModelErrorPolicy, SeedOptions, SeedReport, Seeder};
use crate::error::{SeedingError, SeedingResult};
use crate::fixtures::DirectorySource;
use crate::store::Store;

/// Arguments for the seed command.
#[derive(Debug, Clone, Default)]
pub struct SeedArgs {
	/// Fixture directory. Defaults to `<current dir>/test/fixtures`.
	pub fixture_dir: Option<PathBuf>,

	/// Models to seed, in order. Empty means every fixture file.
	pub models: Vec<String>,
}

/// Options for the seed command.
#[derive(Debug, Clone, Default)]
pub struct SeedCommandOptions {
	/// Engine options.
	pub seed: SeedOptions,

	/// Verbosity level.
	pub verbosity: u8,
}

impl SeedCommandOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Skips the deferred association pass.
	pub fn without_associations(mut self) -> Self {
		self.seed.auto_resolve_associations = false;
		self
	}

	/// Continues with the next model when one fails.
	pub fn with_skip_failed(mut self, skip: bool) -> Self {
		self.seed.on_model_error = if skip {
			ModelErrorPolicy::SkipModel
		} else {
			ModelErrorPolicy::Abort
		};
		self
	}

	/// Sets verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}
}

/// The seed command for populating a store from fixture files.
///
/// # Example
///
/// ```ignore
/// let command = SeedCommand::new();
/// let args = SeedArgs {
///     fixture_dir: Some(PathBuf::from("test/fixtures")),
///     models: vec!["author".into(), "book".into()],
/// };
/// let report = command.execute(&store, args, SeedCommandOptions::new()).await?;
/// println!("Inserted {} records", report.records_inserted);
/// ```
#[derive(Debug, Default)]
pub struct SeedCommand;

impl SeedCommand {
	/// Creates a new seed command.
	pub fn new() -> Self {
		Self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"seed"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Replaces the records of each model with its fixtures and links associations"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: seed [options] [model ...]

Clears each model and inserts the records of its fixture file. Associations
are written as 1-based positions into the target model's fixture file.
Models are seeded in the order given; a model must come after every model
it requires.

Arguments:
  model                Models to seed, in order (default: every fixture file)

Options:
  --fixtures DIR       Fixture directory (default: test/fixtures)
  --no-associations    Do not resolve optional associations
  --skip-failed        Continue with the next model when one fails
  --verbosity LEVEL    Verbosity level (0=minimal, 1=normal, 2=verbose)
"#
	}

	/// Executes the seed command against `store`.
	pub async fn execute<S: Store>(
		&self,
		store: S,
		args: SeedArgs,
		options: SeedCommandOptions,
	) -> SeedingResult<SeedReport> {
		let source = match args.fixture_dir {
			Some(dir) => DirectorySource::new(dir),
			None => DirectorySource::from_current_dir()?,
		};
		if !source.path().is_dir() {
			return Err(SeedingError::FileNotFound(
				source.path().display().to_string(),
			));
		}

		let mut seeder = Seeder::from_source(store, &source)?.with_options(options.seed);
		let models: Vec<&str> = args.models.iter().map(String::as_str).collect();
		let report = seeder
			.seed((!models.is_empty()).then_some(models.as_slice()))
			.await?;

		if options.verbosity > 0 {
			self.log_result(&report);
		}

		Ok(report)
	}

	fn log_result(&self, report: &SeedReport) {
		tracing::info!(
			records = report.records_inserted,
			associations = report.associations_resolved,
			models = report.seeded_models.len(),
			"Installed {} object(s)",
			report.records_inserted
		);

		for (model, error) in &report.failed_models {
			tracing::warn!(model = %model, "Failed: {}", error);
		}
	}
}
