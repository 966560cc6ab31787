//! Store capability consumed by the seeding engine.
//!
//! The engine never talks to a database directly. Anything that can clear a
//! model, describe its associations, insert, fetch, update and attach records
//! can be seeded by implementing [`Store`].

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Store-assigned record identifier.
pub type RecordId = Value;

/// A record as exchanged with the store: field name to value.
pub type Record = Map<String, Value>;

/// Errors raised by a [`Store`] implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
	/// The store has no such model.
	#[error("Unknown model: {0}")]
	UnknownModel(String),

	/// No record with the given identifier exists.
	#[error("Record {id} not found in '{model}'")]
	NotFound {
		/// Model that was queried.
		model: String,
		/// Identifier that was looked up.
		id: RecordId,
	},

	/// Backend-specific failure.
	#[error("Store backend error: {0}")]
	Backend(String),
}

/// Cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
	/// Field holds a single position (foreign key).
	ToOne,
	/// Field holds a list of positions (many-to-many or reverse collection).
	ToMany,
}

/// One association declared by a model's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDescriptor {
	/// Field name on the owning model.
	pub alias: String,
	/// Cardinality.
	pub kind: AssociationKind,
	/// Model the association points to.
	pub target: String,
	/// Must be resolved before the owning record is inserted.
	#[serde(default)]
	pub required: bool,
}

impl AssociationDescriptor {
	/// Declares a to-one association.
	pub fn to_one(alias: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			kind: AssociationKind::ToOne,
			target: target.into(),
			required: false,
		}
	}

	/// Declares a to-many association.
	pub fn to_many(alias: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			kind: AssociationKind::ToMany,
			target: target.into(),
			required: false,
		}
	}

	/// Marks the association as required at insert time.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

/// Schema information the engine needs about a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
	/// Declared associations.
	#[serde(default)]
	pub associations: Vec<AssociationDescriptor>,
}

impl ModelSchema {
	/// Creates a schema with no associations.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an association.
	pub fn with_association(mut self, association: AssociationDescriptor) -> Self {
		self.associations.push(association);
		self
	}
}

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Inserted {
	/// The record as persisted, including store-populated fields.
	pub record: Record,
	/// Identifier assigned by the store.
	pub id: RecordId,
}

/// Persistent store the fixtures are seeded into.
///
/// Every call is awaited before the next one is issued; implementations do
/// not need to handle concurrent calls for the same model.
#[async_trait]
pub trait Store: Send + Sync {
	/// Removes every record of `model`.
	async fn truncate(&self, model: &str) -> Result<(), StoreError>;

	/// Returns the live schema of `model`.
	async fn schema(&self, model: &str) -> Result<ModelSchema, StoreError>;

	/// Inserts `record` and returns the identifier the store assigned.
	async fn insert(&self, model: &str, record: Record) -> Result<Inserted, StoreError>;

	/// Fetches a persisted record.
	async fn fetch_by_id(&self, model: &str, id: &RecordId) -> Result<Record, StoreError>;

	/// Replaces the persisted fields of a record.
	async fn update(&self, model: &str, id: &RecordId, record: Record) -> Result<(), StoreError>;

	/// Adds `target` to the to-many association `alias` of a record.
	///
	/// Attaching is additive: existing members are kept.
	async fn attach(
		&self,
		model: &str,
		id: &RecordId,
		alias: &str,
		target: &RecordId,
	) -> Result<(), StoreError>;
}

macro_rules! forward_store {
	($(<$($generic:tt),+> $ty:ty;)+) => {$(
		#[async_trait]
		impl<$($generic),+> Store for $ty
		where
			T: Store + ?Sized,
		{
			async fn truncate(&self, model: &str) -> Result<(), StoreError> {
				(**self).truncate(model).await
			}

			async fn schema(&self, model: &str) -> Result<ModelSchema, StoreError> {
				(**self).schema(model).await
			}

			async fn insert(&self, model: &str, record: Record) -> Result<Inserted, StoreError> {
				(**self).insert(model, record).await
			}

			async fn fetch_by_id(&self, model: &str, id: &RecordId) -> Result<Record, StoreError> {
				(**self).fetch_by_id(model, id).await
			}

			async fn update(
				&self,
				model: &str,
				id: &RecordId,
				record: Record,
			) -> Result<(), StoreError> {
				(**self).update(model, id, record).await
			}

			async fn attach(
				&self,
				model: &str,
				id: &RecordId,
				alias: &str,
				target: &RecordId,
			) -> Result<(), StoreError> {
				(**self).attach(model, id, alias, target).await
			}
		}
	)+};
}

forward_store! {
	<'a, T> &'a T;
	<T> Arc<T>;
	<T> Box<T>;
}
