//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use reinhardt_fixtures::prelude::*;
//!
//! // Now you have access to:
//! // - Fixture types and sources
//! // - The store capability and the in-memory store
//! // - The seeder and its options
//! // - Error types
//! ```

// Error types
pub use crate::error::{ErrorContext, SeedingError, SeedingResult, StoreOperation};

// Fixture types
pub use crate::fixtures::{
	DirectorySource, FixtureCollection, FixtureFormat, FixtureParser, FixtureRecord, FixtureSet,
	FixtureSource,
};

// Store capability
pub use crate::store::{
	AssociationDescriptor, AssociationKind, Inserted, MemoryStore, ModelSchema, Record, RecordId,
	Store, StoreError,
};

// Engine
pub use crate::engine::{ModelErrorPolicy, ModelState, SeedOptions, SeedReport, Seeder};
pub use crate::identity::{IdentityMap, Position};
pub use crate::registry::AssociationRegistry;

// Command types
pub use crate::commands::{SeedArgs, SeedCommand, SeedCommandOptions};
