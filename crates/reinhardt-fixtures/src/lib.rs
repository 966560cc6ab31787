//! Positional fixture seeding for the Reinhardt framework.
//!
//! This crate seeds a store from fixture files whose records reference each
//! other by position rather than by primary key:
//!
//! - **Fixture System**: One JSON/YAML file per model, records in authored order
//! - **Identity Map**: Translates fixture positions into store-assigned keys
//! - **Seeding Engine**: Clears, inserts and links models in a caller-given order
//! - **CLI Commands**: A `seed` management command
//!
//! # Features
//!
//! - `json` - JSON fixture format support (enabled by default)
//! - `yaml` - YAML fixture format support
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Create one fixture file per model. Associations hold the 1-based position
//! of the target record in the target model's file:
//!
//! `test/fixtures/author.json`
//!
//! ```json
//! [{"name": "A"}, {"name": "B"}]
//! ```
//!
//! `test/fixtures/book.json`
//!
//! ```json
//! [{"title": "X", "author": 1}, {"title": "Y", "author": 2}]
//! ```
//!
//! Seed them, dependencies first:
//!
//! ```ignore
//! use reinhardt_fixtures::prelude::*;
//!
//! let source = DirectorySource::from_current_dir()?;
//! let mut seeder = Seeder::from_source(store, &source)?;
//! let report = seeder.seed(Some(&["author", "book"])).await?;
//! println!("Inserted {} records", report.records_inserted);
//! ```
//!
//! # Architecture
//!
//! - [`FixtureSet`](fixtures::FixtureSet) - Fixture collections keyed by model name
//! - [`Store`](store::Store) - Capability the engine seeds into
//! - [`AssociationRegistry`](registry::AssociationRegistry) - Per-model association descriptors
//! - [`IdentityMap`](identity::IdentityMap) - Position to identifier table
//! - [`Seeder`](engine::Seeder) - Runs the insert pass and the association pass
//!
//! ## Required and deferred associations
//!
//! An association the store marks as required is resolved before its record
//! is inserted, so its target model must already have been seeded in the
//! same run. Every other association is omitted from the insert and written
//! in a second pass once all models exist, which allows cycles between
//! optional associations.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod commands;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod identity;
pub mod prelude;
pub mod registry;
pub mod store;

// Re-export commonly used types at crate root
pub use engine::{ModelErrorPolicy, SeedOptions, SeedReport, Seeder};
pub use error::{SeedingError, SeedingResult};
pub use fixtures::{DirectorySource, FixtureCollection, FixtureSet, FixtureSource};
pub use identity::IdentityMap;
pub use store::{MemoryStore, Store};
