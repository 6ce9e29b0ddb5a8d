//! Database module
//!
//! SQLite connection, migrations and the JSON document store.

pub mod connection;
pub mod documents;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
pub use documents::TrackerPatch;
