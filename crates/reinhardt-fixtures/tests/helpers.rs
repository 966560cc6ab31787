//! Test helpers for reinhardt-fixtures tests.
//!
//! This module provides store setups and fixture data shared by the
//! integration tests.

#[path = "helpers/stores.rs"]
pub mod stores;
#[path = "helpers/test_data.rs"]
pub mod test_data;
