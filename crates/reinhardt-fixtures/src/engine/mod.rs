//! Seeding engine.
//!
//! A [`Seeder`] is one seeding run. It clears each requested model, inserts
//! its fixtures in file order and records the identifier the store assigned
//! to every position. Required associations are rewritten before insert
//! from the identity maps of models seeded earlier in the run; all other
//! associations are left out of the insert and written by the resolver pass
//! once every model exists.
//!
//! Models are processed strictly in the order given, one store call at a
//! time. Listing a dependency after a model that requires it is an
//! [`Ordering`](crate::SeedingError::Ordering) error; the engine never
//! reorders.

mod options;
mod resolver;

pub use options::{ModelErrorPolicy, ModelState, SeedOptions, SeedReport};

use std::collections::HashMap;

use crate::error::{ErrorContext, SeedingError, SeedingResult, StoreOperation};
use crate::fixtures::{
	FixtureCollection, FixtureRecord, FixtureSet, FixtureSource, normalize_model_name,
};
use crate::identity::{IdentityBuilder, IdentityMap, Reference};
use crate::registry::AssociationRegistry;
use crate::store::{Record, Store};

/// One seeding run over a [`Store`].
///
/// The seeder owns every piece of run state: the loaded fixtures, the
/// identity map and the association registries. Dropping it discards them.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use reinhardt_fixtures::prelude::*;
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// store.register_model("author", ModelSchema::new());
/// store.register_model(
///     "book",
///     ModelSchema::new().with_association(AssociationDescriptor::to_one("author", "author").required()),
/// );
///
/// let fixtures = FixtureSet::new()
///     .with_model("author", vec![json!({"name": "A"}), json!({"name": "B"})])
///     .unwrap()
///     .with_model("book", vec![json!({"title": "X", "author": 2})])
///     .unwrap();
///
/// let mut seeder = Seeder::new(store, fixtures);
/// let report = seeder.seed(Some(&["author", "book"])).await.unwrap();
/// assert_eq!(report.records_inserted, 3);
///
/// let author_ids = seeder.identities().get("author").unwrap();
/// assert_eq!(seeder.store().records("book")[0]["author"], author_ids[1]);
/// # });
/// ```
pub struct Seeder<S> {
	store: S,
	fixtures: FixtureSet,
	options: SeedOptions,
	identities: IdentityMap,
	registries: HashMap<String, AssociationRegistry>,
	states: HashMap<String, ModelState>,
}

impl<S: Store> Seeder<S> {
	/// Creates a run over already loaded fixtures.
	pub fn new(store: S, fixtures: FixtureSet) -> Self {
		Self {
			store,
			fixtures,
			options: SeedOptions::default(),
			identities: IdentityMap::new(),
			registries: HashMap::new(),
			states: HashMap::new(),
		}
	}

	/// Creates a run over the fixtures of `source`.
	pub fn from_source(store: S, source: &dyn FixtureSource) -> SeedingResult<Self> {
		Ok(Self::new(store, source.load_all()?))
	}

	/// Replaces the run options.
	pub fn with_options(mut self, options: SeedOptions) -> Self {
		self.options = options;
		self
	}

	/// The store being seeded.
	pub fn store(&self) -> &S {
		&self.store
	}

	/// The loaded fixtures.
	pub fn fixtures(&self) -> &FixtureSet {
		&self.fixtures
	}

	/// The run options.
	pub fn options(&self) -> &SeedOptions {
		&self.options
	}

	/// Identity maps of the models seeded so far.
	pub fn identities(&self) -> &IdentityMap {
		&self.identities
	}

	/// Association registry built for `model` during this run.
	pub fn registry(&self, model: &str) -> Option<&AssociationRegistry> {
		self.registries.get(&normalize_model_name(model))
	}

	/// Current state of `model`.
	pub fn state(&self, model: &str) -> Option<ModelState> {
		self.states.get(&normalize_model_name(model)).copied()
	}

	/// Consumes the run and returns the store.
	pub fn into_store(self) -> S {
		self.store
	}

	/// Seeds `models` in order, or the configured / discovered models when
	/// `None`.
	///
	/// Previous run state is discarded first. When
	/// [`SeedOptions::auto_resolve_associations`] is set, deferred
	/// associations of every successfully seeded model are resolved
	/// afterwards, once per model even if it was listed twice.
	///
	/// # Errors
	///
	/// Fatal errors always abort. Other per-model errors abort under
	/// [`ModelErrorPolicy::Abort`] and are collected in the report under
	/// [`ModelErrorPolicy::SkipModel`].
	pub async fn seed(&mut self, models: Option<&[&str]>) -> SeedingResult<SeedReport> {
		let models = self.model_order(models);
		self.identities.clear();
		self.registries.clear();
		self.states.clear();

		tracing::info!(models = ?models, "Seeding fixtures");

		let mut report = SeedReport::default();
		for model in &models {
			match self.seed_model(model).await {
				Ok(inserted) => {
					report.records_inserted += inserted;
					report.seeded_models.push(model.clone());
				}
				Err(error) => self.handle_model_error(model, error, &mut report)?,
			}
		}

		if self.options.auto_resolve_associations {
			let mut seeded: Vec<String> = Vec::with_capacity(report.seeded_models.len());
			for model in &report.seeded_models {
				if !seeded.contains(model) {
					seeded.push(model.clone());
				}
			}
			self.resolve_models(&seeded, &mut report).await?;
		}

		report.states = self.states.clone();
		Ok(report)
	}

	/// Resolves deferred associations of `models`, or of the configured /
	/// discovered models when `None`.
	///
	/// Every listed model, and every model its deferred associations point
	/// to, must have been seeded by this seeder.
	pub async fn resolve_associations(
		&mut self,
		models: Option<&[&str]>,
	) -> SeedingResult<SeedReport> {
		let models = self.model_order(models);
		let mut report = SeedReport::default();
		self.resolve_models(&models, &mut report).await?;
		report.states = self.states.clone();
		Ok(report)
	}

	fn model_order(&self, models: Option<&[&str]>) -> Vec<String> {
		match (models, &self.options.models) {
			(Some(models), _) => models.iter().map(|m| normalize_model_name(m)).collect(),
			(None, Some(configured)) => configured.iter().map(|m| normalize_model_name(m)).collect(),
			(None, None) => self.fixtures.model_names().to_vec(),
		}
	}

	/// Marks `model` as failed and decides whether the run continues.
	fn handle_model_error(
		&mut self,
		model: &str,
		error: SeedingError,
		report: &mut SeedReport,
	) -> SeedingResult<()> {
		self.states.insert(model.to_string(), ModelState::Failed);

		if error.is_fatal() || self.options.on_model_error == ModelErrorPolicy::Abort {
			tracing::error!(model = %model, error = %error, "Seeding aborted");
			return Err(error);
		}

		tracing::warn!(model = %model, error = %error, "Skipping model");
		report.failed_models.push((model.to_string(), error.to_string()));
		Ok(())
	}

	/// Clears and inserts one model. Returns the number of inserted records.
	async fn seed_model(&mut self, model: &str) -> SeedingResult<usize> {
		// A model listed twice starts over; its previous map is stale.
		self.identities.remove(model);
		self.registries.remove(model);

		let collection = self
			.fixtures
			.get(model)
			.ok_or_else(|| SeedingError::validation(model, "no fixture collection defined"))?;
		if collection.is_empty() {
			return Err(SeedingError::validation(model, "fixture collection is empty"));
		}

		tracing::info!(model = %model, "Deleting existing records");
		self.store.truncate(model).await.map_err(|source| {
			SeedingError::store(StoreOperation::Truncate, model, ErrorContext::default(), source)
		})?;
		self.states.insert(model.to_string(), ModelState::Cleared);

		let registry = AssociationRegistry::build(&self.store, model).await?;
		check_required_targets(model, &registry, &self.identities)?;

		let builder = insert_records(
			&self.store,
			collection,
			&registry,
			&self.identities,
			&mut self.states,
		)
		.await?;

		let inserted = builder.ids().len();
		self.identities.complete(builder)?;
		self.registries.insert(model.to_string(), registry);
		self.states.insert(model.to_string(), ModelState::Inserted);

		tracing::info!(model = %model, records = inserted, "Seeded model");
		Ok(inserted)
	}
}

/// Fails before anything is inserted if a required association points to a
/// model without a complete identity map.
fn check_required_targets(
	model: &str,
	registry: &AssociationRegistry,
	identities: &IdentityMap,
) -> SeedingResult<()> {
	match registry
		.required()
		.find(|descriptor| !identities.contains(&descriptor.target))
	{
		Some(descriptor) => Err(SeedingError::Ordering {
			model: model.to_string(),
			alias: descriptor.alias.clone(),
			target: descriptor.target.clone(),
		}),
		None => Ok(()),
	}
}

async fn insert_records<S: Store + ?Sized>(
	store: &S,
	collection: &FixtureCollection,
	registry: &AssociationRegistry,
	identities: &IdentityMap,
	states: &mut HashMap<String, ModelState>,
) -> SeedingResult<IdentityBuilder> {
	let model = collection.model();
	let mut builder = IdentityBuilder::new(model, collection.len());

	for (position, fixture) in collection.iter() {
		let position_number = position.get() as usize;
		states.insert(model.to_string(), ModelState::Inserting(position_number));

		let payload = insert_payload(model, fixture, registry, identities)?;
		let inserted = store.insert(model, payload).await.map_err(|source| {
			SeedingError::store(
				StoreOperation::Insert,
				model,
				ErrorContext::at(position_number),
				source,
			)
		})?;

		builder.push(inserted.id)?;
		tracing::debug!(model = %model, position = position_number, "Inserted record");
	}

	Ok(builder)
}

/// Builds the working copy of a fixture that is sent to the store.
///
/// Required associations are rewritten to store identifiers. Deferred
/// associations are dropped; the resolver writes them later.
fn insert_payload(
	model: &str,
	fixture: &FixtureRecord,
	registry: &AssociationRegistry,
	identities: &IdentityMap,
) -> SeedingResult<Record> {
	let mut working = fixture.clone();

	for (alias, value) in fixture {
		let Some(descriptor) = registry.get(alias) else {
			continue;
		};
		if !descriptor.required {
			working.remove(alias);
			continue;
		}
		if value.is_null() {
			continue;
		}

		let reference = Reference {
			alias,
			target: &descriptor.target,
			kind: descriptor.kind,
			value,
		};
		let resolved = identities.resolve_reference(model, &reference)?;
		working.insert(alias.clone(), resolved);
	}

	Ok(working)
}
