//! Seeding configuration and run reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What to do when one model fails to seed or resolve.
///
/// Ordering errors, out-of-bounds positions and failed truncations abort the
/// run under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelErrorPolicy {
	/// Stop the run and return the error.
	#[default]
	Abort,

	/// Record the failure in the [`SeedReport`] and continue with the next
	/// model. Models that depend on the failed one will then fail with an
	/// ordering error.
	SkipModel,
}

/// Options for a seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
	/// Resolve deferred associations right after every model is inserted.
	pub auto_resolve_associations: bool,

	/// Failure handling for individual models.
	pub on_model_error: ModelErrorPolicy,

	/// Models to seed, in order. `None` seeds every loaded model in
	/// discovery order.
	pub models: Option<Vec<String>>,
}

impl Default for SeedOptions {
	fn default() -> Self {
		Self {
			auto_resolve_associations: true,
			on_model_error: ModelErrorPolicy::Abort,
			models: None,
		}
	}
}

impl SeedOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether deferred associations are resolved automatically.
	pub fn with_auto_resolve(mut self, auto_resolve: bool) -> Self {
		self.auto_resolve_associations = auto_resolve;
		self
	}

	/// Sets the model failure policy.
	pub fn with_error_policy(mut self, policy: ModelErrorPolicy) -> Self {
		self.on_model_error = policy;
		self
	}

	/// Sets the default model order.
	pub fn with_models<I, M>(mut self, models: I) -> Self
	where
		I: IntoIterator<Item = M>,
		M: Into<String>,
	{
		self.models = Some(models.into_iter().map(Into::into).collect());
		self
	}
}

/// Lifecycle of one model within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
	/// Existing records were removed.
	Cleared,
	/// Inserting the record at the given 1-based position.
	Inserting(usize),
	/// Every record was inserted and the identity map is complete.
	Inserted,
	/// Resolving deferred associations of the record at the given position.
	Resolving(usize),
	/// Deferred associations are resolved.
	Resolved,
	/// Seeding or resolution stopped with an error.
	Failed,
}

/// Outcome of a seeding or resolution run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
	/// Number of records inserted.
	pub records_inserted: usize,

	/// Number of deferred association fields written.
	pub associations_resolved: usize,

	/// Models whose records were all inserted, in seeding order.
	pub seeded_models: Vec<String>,

	/// Models that failed, with the error message, when running under
	/// [`ModelErrorPolicy::SkipModel`].
	pub failed_models: Vec<(String, String)>,

	/// Final state of every model touched by the run.
	pub states: HashMap<String, ModelState>,
}

impl SeedReport {
	/// Returns true if no model failed.
	pub fn is_success(&self) -> bool {
		self.failed_models.is_empty()
	}

	/// Final state of `model`.
	pub fn state(&self, model: &str) -> Option<ModelState> {
		self.states.get(model).copied()
	}
}
