//! Identity map from fixture positions to store-assigned identifiers.
//!
//! Fixture authors reference other records by their 1-based position in the
//! target model's fixture file. Once the target model has been inserted, the
//! identity map translates those positions into the identifiers the store
//! actually assigned.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{SeedingError, SeedingResult};
use crate::store::{AssociationKind, RecordId};

/// A 1-based fixture position as written by fixture authors.
///
/// This is the only place where author positions are converted to
/// 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(i64);

impl Position {
	/// Wraps an authored position. The value is not validated until it is
	/// resolved against a concrete identity map.
	pub fn new(position: i64) -> Self {
		Self(position)
	}

	/// Position of the record stored at 0-based `index`.
	pub fn from_index(index: usize) -> Self {
		Self(index as i64 + 1)
	}

	/// The authored value.
	pub fn get(self) -> i64 {
		self.0
	}

	/// 0-based index into a collection of `len` items, if in range.
	pub fn index(self, len: usize) -> Option<usize> {
		let index = usize::try_from(self.0.checked_sub(1)?).ok()?;
		(index < len).then_some(index)
	}
}

/// Identifiers of one model, accumulated while its fixtures are inserted.
///
/// Entries are only pushed in fixture order. The builder becomes part of
/// the [`IdentityMap`] through [`IdentityMap::complete`].
#[derive(Debug, Clone)]
pub struct IdentityBuilder {
	model: String,
	expected: usize,
	ids: Vec<RecordId>,
}

impl IdentityBuilder {
	/// Starts collecting identifiers for `expected` records of `model`.
	pub fn new(model: impl Into<String>, expected: usize) -> Self {
		Self {
			model: model.into(),
			expected,
			ids: Vec::with_capacity(expected),
		}
	}

	/// Records the identifier of the next fixture position.
	///
	/// Returns [`SeedingError::MissingIdentifier`] if the store produced a
	/// null identifier.
	pub fn push(&mut self, id: RecordId) -> SeedingResult<Position> {
		let position = Position::from_index(self.ids.len());
		if id.is_null() {
			return Err(SeedingError::MissingIdentifier {
				model: self.model.clone(),
				position: position.get() as usize,
			});
		}
		self.ids.push(id);
		Ok(position)
	}

	/// Identifiers collected so far.
	pub fn ids(&self) -> &[RecordId] {
		&self.ids
	}

	/// Returns true once every expected record has an identifier.
	pub fn is_complete(&self) -> bool {
		self.ids.len() == self.expected
	}
}

/// Run-scoped table translating fixture positions into store identifiers.
///
/// For every model the map is either absent (not seeded yet, or seeding
/// failed) or holds exactly one non-null identifier per fixture record.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
	models: HashMap<String, Vec<RecordId>>,
}

impl IdentityMap {
	/// Creates an empty identity map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes a fully populated builder.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Validation`] if some records have no
	/// identifier yet.
	pub fn complete(&mut self, builder: IdentityBuilder) -> SeedingResult<()> {
		if !builder.is_complete() {
			return Err(SeedingError::validation(
				&builder.model,
				format!(
					"identity map has {} of {} entries",
					builder.ids.len(),
					builder.expected
				),
			));
		}
		self.models.insert(builder.model, builder.ids);
		Ok(())
	}

	/// Identifiers of `model` in fixture order.
	pub fn get(&self, model: &str) -> Option<&[RecordId]> {
		self.models.get(model).map(Vec::as_slice)
	}

	/// Returns true if `model` has been seeded in this run.
	pub fn contains(&self, model: &str) -> bool {
		self.models.contains_key(model)
	}

	/// Forgets `model`.
	pub fn remove(&mut self, model: &str) -> Option<Vec<RecordId>> {
		self.models.remove(model)
	}

	/// Forgets every model.
	pub fn clear(&mut self) {
		self.models.clear();
	}

	/// Number of seeded models.
	pub fn len(&self) -> usize {
		self.models.len()
	}

	/// Returns true if no model has been seeded.
	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}

	/// Looks up the identifier of `target` at `position`.
	///
	/// `model` and `alias` only describe the referencing side for the
	/// ordering error.
	///
	/// # Errors
	///
	/// - [`SeedingError::Ordering`] if `target` has no identity map
	/// - [`SeedingError::OutOfBounds`] if `position` is outside `1..=len`
	pub fn resolve_position(
		&self,
		model: &str,
		alias: &str,
		target: &str,
		position: Position,
	) -> SeedingResult<&RecordId> {
		let ids = self.get(target).ok_or_else(|| SeedingError::Ordering {
			model: model.to_string(),
			alias: alias.to_string(),
			target: target.to_string(),
		})?;
		position
			.index(ids.len())
			.map(|index| &ids[index])
			.ok_or_else(|| SeedingError::OutOfBounds {
				target: target.to_string(),
				position: position.get(),
				len: ids.len(),
			})
	}

	/// Rewrites an association field value into store identifiers.
	///
	/// A to-one field must hold one position and resolves to one identifier.
	/// A to-many field must hold a list of positions and resolves to a list
	/// of identifiers in the same order.
	pub fn resolve_reference(
		&self,
		model: &str,
		reference: &Reference<'_>,
	) -> SeedingResult<Value> {
		match reference.kind {
			AssociationKind::ToOne => {
				let position = reference.position(model, reference.value)?;
				self.resolve_position(model, reference.alias, reference.target, position)
					.cloned()
			}
			AssociationKind::ToMany => self
				.resolve_many(model, reference)
				.map(Value::Array),
		}
	}

	/// Resolves a to-many field element by element.
	pub fn resolve_many(
		&self,
		model: &str,
		reference: &Reference<'_>,
	) -> SeedingResult<Vec<RecordId>> {
		let Value::Array(items) = reference.value else {
			return Err(reference.invalid(model, "expected a list of positions"));
		};
		items
			.iter()
			.map(|item| {
				let position = reference.position(model, item)?;
				self.resolve_position(model, reference.alias, reference.target, position)
					.cloned()
			})
			.collect()
	}
}

/// An association field value awaiting resolution.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
	/// Association alias on the referencing model.
	pub alias: &'a str,
	/// Model the positions point into.
	pub target: &'a str,
	/// Cardinality of the association.
	pub kind: AssociationKind,
	/// Authored value: a position or a list of positions.
	pub value: &'a Value,
}

impl Reference<'_> {
	fn position(&self, model: &str, value: &Value) -> SeedingResult<Position> {
		value
			.as_i64()
			.map(Position::new)
			.ok_or_else(|| self.invalid(model, format!("expected a position, found {}", value)))
	}

	fn invalid(&self, model: &str, message: impl Into<String>) -> SeedingError {
		SeedingError::InvalidReference {
			model: model.to_string(),
			alias: self.alias.to_string(),
			message: message.into(),
		}
	}
}
