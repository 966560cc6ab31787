//! Error types for the fixtures module.
//!
//! This module defines the error types used throughout the reinhardt-fixtures crate.

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Store operation that produced a [`SeedingError::Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
	/// Clearing every record of a model.
	Truncate,
	/// Reading a model's association schema.
	Schema,
	/// Inserting a fixture record.
	Insert,
	/// Reading back a persisted record.
	Fetch,
	/// Persisting resolved to-one associations.
	Update,
	/// Adding one element to a to-many association.
	Attach,
}

impl fmt::Display for StoreOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Truncate => "truncate",
			Self::Schema => "schema",
			Self::Insert => "insert",
			Self::Fetch => "fetch",
			Self::Update => "update",
			Self::Attach => "attach",
		};
		f.write_str(name)
	}
}

/// Location of a store failure, rendered as ` at position N, alias 'x'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
	/// 1-based fixture position, when the failure concerns one record.
	pub position: Option<usize>,
	/// Association alias, when the failure concerns one field.
	pub alias: Option<String>,
}

impl ErrorContext {
	/// Context pointing at a single fixture record.
	pub fn at(position: usize) -> Self {
		Self {
			position: Some(position),
			alias: None,
		}
	}

	/// Adds the association alias to the context.
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = Some(alias.into());
		self
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(position) = self.position {
			write!(f, " at position {}", position)?;
		}
		if let Some(alias) = &self.alias {
			write!(f, ", alias '{}'", alias)?;
		}
		Ok(())
	}
}

/// Errors that can occur during seeding operations.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// Fixture collection is missing, empty or structurally invalid.
	#[error("Validation error: {model}: {message}")]
	Validation {
		/// Model the collection belongs to.
		model: String,
		/// Validation error message.
		message: String,
	},

	/// An association targets a model that has not been seeded yet.
	#[error(
		"Ordering error: {model}.{alias} references '{target}' which has not been seeded; \
		 list '{target}' before '{model}'"
	)]
	Ordering {
		/// Model holding the association.
		model: String,
		/// Association alias.
		alias: String,
		/// Target model lacking an identity map.
		target: String,
	},

	/// A positional reference lies outside the target collection.
	#[error("Position {position} is out of bounds for '{target}' ({len} record(s))")]
	OutOfBounds {
		/// Target model.
		target: String,
		/// Offending 1-based position, as authored.
		position: i64,
		/// Number of records in the target identity map.
		len: usize,
	},

	/// An association field does not hold a position or list of positions.
	#[error("Invalid reference in {model}.{alias}: {message}")]
	InvalidReference {
		/// Model holding the association.
		model: String,
		/// Association alias.
		alias: String,
		/// Description of the malformed value.
		message: String,
	},

	/// The store capability failed.
	#[error("Store {operation} failed for '{model}'{context}: {source}")]
	Store {
		/// Operation that failed.
		operation: StoreOperation,
		/// Model being processed.
		model: String,
		/// Record and field being processed.
		context: ErrorContext,
		/// Underlying store error.
		#[source]
		source: StoreError,
	},

	/// Deferred associations were requested for a model that was not
	/// seeded in this run.
	#[error("Model '{0}' has not been seeded in this run")]
	NotSeeded(String),

	/// The store accepted a record but reported a null identifier.
	#[error("Store returned no identifier for '{model}' at position {position}")]
	MissingIdentifier {
		/// Model being processed.
		model: String,
		/// 1-based fixture position.
		position: usize,
	},

	/// Error parsing fixture data.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// YAML serialization/deserialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	YamlError(#[from] serde_yaml::Error),

	/// Fixture file or directory not found.
	#[error("Fixture source not found: {0}")]
	FileNotFound(String),

	/// Unsupported file extension.
	#[error("Unsupported file extension: {0}")]
	UnsupportedExtension(String),
}

impl SeedingError {
	/// Builds a [`SeedingError::Validation`].
	pub fn validation(model: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Validation {
			model: model.into(),
			message: message.into(),
		}
	}

	/// Builds a [`SeedingError::Store`].
	pub fn store(
		operation: StoreOperation,
		model: impl Into<String>,
		context: ErrorContext,
		source: StoreError,
	) -> Self {
		Self::Store {
			operation,
			model: model.into(),
			context,
			source,
		}
	}

	/// Returns true if this error aborts the whole run regardless of
	/// [`ModelErrorPolicy`](crate::engine::ModelErrorPolicy).
	///
	/// Ordering and out-of-bounds errors are authoring bugs, and a failed
	/// truncation leaves the store in an unknown state.
	pub fn is_fatal(&self) -> bool {
		match self {
			Self::Ordering { .. } | Self::OutOfBounds { .. } => true,
			Self::Store { operation, .. } => *operation == StoreOperation::Truncate,
			_ => false,
		}
	}
}

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_validation_error() {
		let error = SeedingError::validation("author", "empty fixture collection");
		assert_eq!(
			error.to_string(),
			"Validation error: author: empty fixture collection"
		);
		assert!(!error.is_fatal());
	}

	#[rstest]
	fn test_ordering_error_is_fatal() {
		let error = SeedingError::Ordering {
			model: "book".to_string(),
			alias: "author".to_string(),
			target: "author".to_string(),
		};
		assert!(error.is_fatal());
		assert!(error.to_string().contains("list 'author' before 'book'"));
	}

	#[rstest]
	fn test_store_error_context() {
		let error = SeedingError::store(
			StoreOperation::Attach,
			"post",
			ErrorContext::at(3).with_alias("tags"),
			StoreError::Backend("connection reset".to_string()),
		);
		assert_eq!(
			error.to_string(),
			"Store attach failed for 'post' at position 3, alias 'tags': \
			 Store backend error: connection reset"
		);
		assert!(!error.is_fatal());
	}

	#[rstest]
	#[case(StoreOperation::Truncate, true)]
	#[case(StoreOperation::Insert, false)]
	#[case(StoreOperation::Update, false)]
	fn test_store_error_fatality(#[case] operation: StoreOperation, #[case] fatal: bool) {
		let error = SeedingError::store(
			operation,
			"author",
			ErrorContext::default(),
			StoreError::UnknownModel("author".to_string()),
		);
		assert_eq!(error.is_fatal(), fatal);
	}

	#[rstest]
	fn test_io_error_from() {
		let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
		let seeding_error: SeedingError = io_error.into();
		assert!(matches!(seeding_error, SeedingError::IoError(_)));
	}

	#[rstest]
	fn test_json_error_from() {
		let json_error: serde_json::Error =
			serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
		let seeding_error: SeedingError = json_error.into();
		assert!(matches!(seeding_error, SeedingError::JsonError(_)));
	}
}
