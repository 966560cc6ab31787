//! In-memory fixture store.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::normalize_model_name;
use crate::error::{SeedingError, SeedingResult};
use crate::identity::Position;

/// One authored fixture record: field name to value.
pub type FixtureRecord = Map<String, Value>;

/// Ordered fixture records of a single model.
///
/// The order is the order of the fixture file and defines each record's
/// [`Position`].
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCollection {
	model: String,
	records: Vec<FixtureRecord>,
	source: Option<String>,
}

impl FixtureCollection {
	/// Creates a collection for `model`.
	pub fn new(model: impl AsRef<str>, records: Vec<FixtureRecord>) -> Self {
		Self {
			model: normalize_model_name(model.as_ref()),
			records,
			source: None,
		}
	}

	/// Creates a collection from raw values, each of which must be a JSON
	/// object.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Validation`] naming the first value that is
	/// not an object.
	pub fn from_values(model: impl AsRef<str>, values: Vec<Value>) -> SeedingResult<Self> {
		let model = normalize_model_name(model.as_ref());
		let records = values
			.into_iter()
			.enumerate()
			.map(|(idx, value)| match value {
				Value::Object(record) => Ok(record),
				other => Err(SeedingError::validation(
					&model,
					format!("record at index {} is not an object: {}", idx, other),
				)),
			})
			.collect::<SeedingResult<Vec<_>>>()?;
		Ok(Self {
			model,
			records,
			source: None,
		})
	}

	/// Sets the file the records were read from.
	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Model name.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// File the records were read from, if any.
	pub fn source(&self) -> Option<&str> {
		self.source.as_deref()
	}

	/// Records in authored order.
	pub fn records(&self) -> &[FixtureRecord] {
		&self.records
	}

	/// Record at a 1-based position.
	pub fn get(&self, position: Position) -> Option<&FixtureRecord> {
		position
			.index(self.records.len())
			.map(|index| &self.records[index])
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns true if there are no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Iterates records together with their positions.
	pub fn iter(&self) -> impl Iterator<Item = (Position, &FixtureRecord)> {
		self.records
			.iter()
			.enumerate()
			.map(|(index, record)| (Position::from_index(index), record))
	}
}

/// Fixture collections of every model, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
	order: Vec<String>,
	collections: HashMap<String, FixtureCollection>,
}

impl FixtureSet {
	/// Creates an empty fixture set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a collection built from `records`.
	///
	/// # Example
	///
	/// ```
	/// # use reinhardt_fixtures::fixtures::FixtureSet;
	/// # use serde_json::json;
	/// let fixtures = FixtureSet::new()
	///     .with_model("author", vec![json!({"name": "A"})])?
	///     .with_model("book", vec![json!({"title": "X", "author": 1})])?;
	/// assert_eq!(fixtures.model_names(), ["author", "book"]);
	/// # Ok::<(), reinhardt_fixtures::SeedingError>(())
	/// ```
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Validation`] if a record is not a JSON object.
	pub fn with_model(mut self, model: &str, records: Vec<Value>) -> SeedingResult<Self> {
		self.insert(FixtureCollection::from_values(model, records)?);
		Ok(self)
	}

	/// Adds or replaces a collection. A replaced collection keeps its
	/// original discovery slot.
	pub fn insert(&mut self, collection: FixtureCollection) -> Option<FixtureCollection> {
		let model = collection.model().to_string();
		if !self.collections.contains_key(&model) {
			self.order.push(model.clone());
		}
		self.collections.insert(model, collection)
	}

	/// Collection of `model`.
	pub fn get(&self, model: &str) -> Option<&FixtureCollection> {
		self.collections.get(&normalize_model_name(model))
	}

	/// Returns true if `model` has a collection.
	pub fn contains(&self, model: &str) -> bool {
		self.collections.contains_key(&normalize_model_name(model))
	}

	/// Model names in discovery order.
	pub fn model_names(&self) -> &[String] {
		&self.order
	}

	/// Number of models.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// Returns true if no model has fixtures.
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Iterates collections in discovery order.
	pub fn iter(&self) -> impl Iterator<Item = &FixtureCollection> {
		self.order
			.iter()
			.filter_map(|model| self.collections.get(model))
	}
}
