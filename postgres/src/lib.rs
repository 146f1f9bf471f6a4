//! Postgres access for the reference database: connection pools, raw statement execution
//! and the generic read/write bridges used by pipeline runs.

pub mod db;
pub mod reference;
pub mod schema;
#[cfg(feature = "test-utils")]
pub mod test_utils;
