//! Fixture loading.
//!
//! Fixtures are authored one file per model. Associations between records
//! are written as 1-based positions into the target model's file and are
//! rewritten into store identifiers by the [`Seeder`](crate::engine::Seeder).

mod format;
mod parser;
mod set;
mod source;

pub use format::{FixtureFormat, model_name_from_path, normalize_model_name};
pub use parser::FixtureParser;
pub use set::{FixtureCollection, FixtureRecord, FixtureSet};
pub use source::{DEFAULT_FIXTURE_DIR, DirectorySource, FixtureSource};
