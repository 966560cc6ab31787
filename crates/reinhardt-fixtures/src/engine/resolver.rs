//! Deferred association pass.
//!
//! Runs after insertion, when every identity map of the run is complete.
//! For each record that carries deferred associations the persisted record
//! is fetched once; to-one fields are set on it and written back with
//! `update`, then to-many targets are attached one at a time. Attaching is
//! additive, so running the pass twice does not drop existing members.

use super::{ModelErrorPolicy, ModelState, SeedReport, Seeder};
use crate::error::{ErrorContext, SeedingError, SeedingResult, StoreOperation};
use crate::fixtures::FixtureRecord;
use crate::identity::{IdentityMap, Reference};
use crate::registry::AssociationRegistry;
use crate::store::{AssociationKind, RecordId, Store};

/// Deferred associations of one record, resolved to store identifiers.
#[derive(Debug, Default)]
struct ResolvedRecord<'a> {
	to_one: Vec<(&'a str, RecordId)>,
	to_many: Vec<(&'a str, Vec<RecordId>)>,
}

impl ResolvedRecord<'_> {
	fn is_empty(&self) -> bool {
		self.to_one.is_empty() && self.to_many.is_empty()
	}

	fn len(&self) -> usize {
		self.to_one.len() + self.to_many.len()
	}
}

impl<S: Store> Seeder<S> {
	pub(super) async fn resolve_models(
		&mut self,
		models: &[String],
		report: &mut SeedReport,
	) -> SeedingResult<()> {
		for model in models {
			match self.resolve_model(model).await {
				Ok(resolved) => {
					report.associations_resolved += resolved;
					self.states.insert(model.clone(), ModelState::Resolved);
					tracing::info!(model = %model, associations = resolved, "Resolved associations");
				}
				Err(error) => {
					self.states.insert(model.clone(), ModelState::Failed);
					if error.is_fatal() || self.options.on_model_error == ModelErrorPolicy::Abort {
						tracing::error!(model = %model, error = %error, "Association resolution aborted");
						return Err(error);
					}
					tracing::warn!(model = %model, error = %error, "Skipping association resolution");
					report.failed_models.push((model.clone(), error.to_string()));
				}
			}
		}
		Ok(())
	}

	/// Resolves one model. Returns the number of association fields written.
	async fn resolve_model(&mut self, model: &str) -> SeedingResult<usize> {
		let (Some(collection), Some(registry), Some(ids)) = (
			self.fixtures.get(model),
			self.registries.get(model),
			self.identities.get(model),
		) else {
			return Err(SeedingError::NotSeeded(model.to_string()));
		};

		let mut written = 0;
		for ((position, fixture), id) in collection.iter().zip(ids) {
			let position_number = position.get() as usize;
			let resolved = resolve_record(model, fixture, registry, &self.identities)?;
			if resolved.is_empty() {
				continue;
			}

			self.states
				.insert(model.to_string(), ModelState::Resolving(position_number));
			persist(&self.store, model, position_number, id, &resolved).await?;
			written += resolved.len();
			tracing::debug!(model = %model, position = position_number, "Linked record");
		}

		Ok(written)
	}
}

/// Resolves every deferred association present on one fixture.
///
/// Nothing is written until all of them resolve, so a bad reference leaves
/// the persisted record untouched.
fn resolve_record<'a>(
	model: &str,
	fixture: &'a FixtureRecord,
	registry: &'a AssociationRegistry,
	identities: &IdentityMap,
) -> SeedingResult<ResolvedRecord<'a>> {
	let mut resolved = ResolvedRecord::default();

	for (alias, value) in fixture {
		let Some(descriptor) = registry.get(alias) else {
			continue;
		};
		if descriptor.required || value.is_null() {
			continue;
		}

		let reference = Reference {
			alias,
			target: &descriptor.target,
			kind: descriptor.kind,
			value,
		};
		match descriptor.kind {
			AssociationKind::ToOne => {
				let id = identities.resolve_reference(model, &reference)?;
				resolved.to_one.push((alias.as_str(), id));
			}
			AssociationKind::ToMany => {
				let ids = identities.resolve_many(model, &reference)?;
				resolved.to_many.push((alias.as_str(), ids));
			}
		}
	}

	Ok(resolved)
}

async fn persist<S: Store + ?Sized>(
	store: &S,
	model: &str,
	position: usize,
	id: &RecordId,
	resolved: &ResolvedRecord<'_>,
) -> SeedingResult<()> {
	let mut record = store.fetch_by_id(model, id).await.map_err(|source| {
		SeedingError::store(StoreOperation::Fetch, model, ErrorContext::at(position), source)
	})?;

	if !resolved.to_one.is_empty() {
		for (alias, target) in &resolved.to_one {
			record.insert((*alias).to_string(), target.clone());
		}
		store.update(model, id, record).await.map_err(|source| {
			SeedingError::store(StoreOperation::Update, model, ErrorContext::at(position), source)
		})?;
	}

	for (alias, targets) in &resolved.to_many {
		for target in targets {
			store.attach(model, id, alias, target).await.map_err(|source| {
				SeedingError::store(
					StoreOperation::Attach,
					model,
					ErrorContext::at(position).with_alias(*alias),
					source,
				)
			})?;
		}
	}

	Ok(())
}
