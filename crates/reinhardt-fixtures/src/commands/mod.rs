//! Management commands.

mod seed;

pub use seed::{SeedArgs, SeedCommand, SeedCommandOptions};
