//! In-memory [`Store`] implementation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{Inserted, ModelSchema, Record, RecordId, Store, StoreError};

/// Field the memory store writes the assigned identifier to.
const PRIMARY_KEY: &str = "id";

#[derive(Debug, Default)]
struct Table {
	schema: ModelSchema,
	rows: Vec<(u64, Record)>,
	inserts: usize,
}

impl Table {
	fn row_mut(&mut self, model: &str, id: &RecordId) -> Result<&mut Record, StoreError> {
		let key = id.as_u64();
		self.rows
			.iter_mut()
			.find(|(pk, _)| Some(*pk) == key)
			.map(|(_, record)| record)
			.ok_or_else(|| StoreError::NotFound {
				model: model.to_string(),
				id: id.clone(),
			})
	}
}

#[derive(Debug, Default)]
struct State {
	tables: HashMap<String, Table>,
	next_id: u64,
	failing_inserts: HashSet<(String, usize)>,
	failing_truncates: HashSet<String>,
	failing_updates: HashSet<String>,
	failing_attaches: HashSet<String>,
}

/// A [`Store`] keeping every model in memory.
///
/// Identifiers are integers drawn from a single counter that is never reset,
/// so re-seeding produces fresh keys the way a database sequence would.
///
/// # Example
///
/// ```
/// use reinhardt_fixtures::store::{AssociationDescriptor, MemoryStore, ModelSchema};
///
/// let store = MemoryStore::new();
/// store.register_model("author", ModelSchema::new());
/// store.register_model(
///     "book",
///     ModelSchema::new().with_association(AssociationDescriptor::to_one("author", "author").required()),
/// );
/// assert!(store.has_model("book"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
	state: RwLock<State>,
}

impl MemoryStore {
	/// Creates an empty store with no models.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a model and its schema. Re-registering replaces the schema
	/// and keeps existing rows.
	pub fn register_model(&self, model: impl Into<String>, schema: ModelSchema) {
		let mut state = self.state.write();
		state.tables.entry(model.into()).or_default().schema = schema;
	}

	/// Returns true if `model` was registered.
	pub fn has_model(&self, model: &str) -> bool {
		self.state.read().tables.contains_key(model)
	}

	/// Makes the `n`-th insert (1-based) into `model` after the last
	/// truncation fail with a backend error.
	pub fn fail_insert_at(&self, model: impl Into<String>, n: usize) {
		self.state.write().failing_inserts.insert((model.into(), n));
	}

	/// Makes every truncation of `model` fail with a backend error.
	pub fn fail_truncate(&self, model: impl Into<String>) {
		self.state.write().failing_truncates.insert(model.into());
	}

	/// Makes every update of a `model` record fail with a backend error.
	pub fn fail_update(&self, model: impl Into<String>) {
		self.state.write().failing_updates.insert(model.into());
	}

	/// Makes every attach on a `model` record fail with a backend error.
	pub fn fail_attach(&self, model: impl Into<String>) {
		self.state.write().failing_attaches.insert(model.into());
	}

	/// Returns the persisted records of `model` in insertion order.
	pub fn records(&self, model: &str) -> Vec<Record> {
		self.state
			.read()
			.tables
			.get(model)
			.map(|table| table.rows.iter().map(|(_, record)| record.clone()).collect())
			.unwrap_or_default()
	}

	/// Returns the number of persisted records of `model`.
	pub fn count(&self, model: &str) -> usize {
		self.state
			.read()
			.tables
			.get(model)
			.map_or(0, |table| table.rows.len())
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn truncate(&self, model: &str) -> Result<(), StoreError> {
		let mut state = self.state.write();
		if state.failing_truncates.contains(model) {
			return Err(StoreError::Backend(format!("cannot truncate '{}'", model)));
		}
		let table = state
			.tables
			.get_mut(model)
			.ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
		table.rows.clear();
		table.inserts = 0;
		Ok(())
	}

	async fn schema(&self, model: &str) -> Result<ModelSchema, StoreError> {
		self.state
			.read()
			.tables
			.get(model)
			.map(|table| table.schema.clone())
			.ok_or_else(|| StoreError::UnknownModel(model.to_string()))
	}

	async fn insert(&self, model: &str, mut record: Record) -> Result<Inserted, StoreError> {
		let mut guard = self.state.write();
		let state = &mut *guard;
		let table = state
			.tables
			.get_mut(model)
			.ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;

		table.inserts += 1;
		if state
			.failing_inserts
			.contains(&(model.to_string(), table.inserts))
		{
			return Err(StoreError::Backend(format!(
				"rejected insert #{} into '{}'",
				table.inserts, model
			)));
		}

		state.next_id += 1;
		let pk = state.next_id;
		record.insert(PRIMARY_KEY.to_string(), Value::from(pk));
		table.rows.push((pk, record.clone()));

		Ok(Inserted {
			record,
			id: Value::from(pk),
		})
	}

	async fn fetch_by_id(&self, model: &str, id: &RecordId) -> Result<Record, StoreError> {
		let mut state = self.state.write();
		let table = state
			.tables
			.get_mut(model)
			.ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
		table.row_mut(model, id).map(|record| record.clone())
	}

	async fn update(&self, model: &str, id: &RecordId, mut record: Record) -> Result<(), StoreError> {
		let mut state = self.state.write();
		if state.failing_updates.contains(model) {
			return Err(StoreError::Backend(format!("cannot update '{}' {}", model, id)));
		}
		let table = state
			.tables
			.get_mut(model)
			.ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
		let row = table.row_mut(model, id)?;
		record.insert(PRIMARY_KEY.to_string(), id.clone());
		*row = record;
		Ok(())
	}

	async fn attach(
		&self,
		model: &str,
		id: &RecordId,
		alias: &str,
		target: &RecordId,
	) -> Result<(), StoreError> {
		let mut state = self.state.write();
		if state.failing_attaches.contains(model) {
			return Err(StoreError::Backend(format!(
				"cannot attach to '{}.{}'",
				model, alias
			)));
		}
		let table = state
			.tables
			.get_mut(model)
			.ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
		let row = table.row_mut(model, id)?;

		let members = row
			.entry(alias.to_string())
			.or_insert_with(|| Value::Array(Vec::new()));
		match members {
			Value::Array(items) => {
				if !items.contains(target) {
					items.push(target.clone());
				}
				Ok(())
			}
			Value::Null => {
				*members = Value::Array(vec![target.clone()]);
				Ok(())
			}
			other => Err(StoreError::Backend(format!(
				"field '{}' of '{}' is not a collection: {}",
				alias, model, other
			))),
		}
	}
}
