//! Per-model association registry.
//!
//! Built from the store's live schema at the start of every seeding run.

use crate::error::{ErrorContext, SeedingError, SeedingResult, StoreOperation};
use crate::store::{AssociationDescriptor, Store};

/// Association descriptors of one model, in schema order.
#[derive(Debug, Clone, Default)]
pub struct AssociationRegistry {
	model: String,
	associations: Vec<AssociationDescriptor>,
}

impl AssociationRegistry {
	/// Builds the registry for `model` from the store schema.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Store`] if the schema cannot be read.
	pub async fn build<S: Store + ?Sized>(store: &S, model: &str) -> SeedingResult<Self> {
		let schema = store.schema(model).await.map_err(|source| {
			SeedingError::store(StoreOperation::Schema, model, ErrorContext::default(), source)
		})?;
		Ok(Self::from_descriptors(model, schema.associations))
	}

	/// Builds a registry from already known descriptors.
	///
	/// A later descriptor for an alias already seen replaces the earlier one
	/// in place.
	pub fn from_descriptors(
		model: impl Into<String>,
		descriptors: impl IntoIterator<Item = AssociationDescriptor>,
	) -> Self {
		let mut associations: Vec<AssociationDescriptor> = Vec::new();
		for descriptor in descriptors {
			match associations.iter_mut().find(|d| d.alias == descriptor.alias) {
				Some(existing) => *existing = descriptor,
				None => associations.push(descriptor),
			}
		}
		Self {
			model: model.into(),
			associations,
		}
	}

	/// Model this registry describes.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// Descriptor of `alias`, if it is an association.
	pub fn get(&self, alias: &str) -> Option<&AssociationDescriptor> {
		self.associations.iter().find(|d| d.alias == alias)
	}

	/// Returns true if `alias` is an association.
	pub fn contains(&self, alias: &str) -> bool {
		self.get(alias).is_some()
	}

	/// Associations that must be resolved before insert, in schema order.
	pub fn required(&self) -> impl Iterator<Item = &AssociationDescriptor> {
		self.associations.iter().filter(|d| d.required)
	}

	/// Associations resolved after every model has been inserted, in schema
	/// order.
	pub fn deferred(&self) -> impl Iterator<Item = &AssociationDescriptor> {
		self.associations.iter().filter(|d| !d.required)
	}

	/// Number of associations.
	pub fn len(&self) -> usize {
		self.associations.len()
	}

	/// Returns true if the model declares no associations.
	pub fn is_empty(&self) -> bool {
		self.associations.is_empty()
	}
}
