//! Database layer for soundcloud-dl
//!
//! SQLite persistence for state that must survive restarts. Today that is the
//! cached access id and its extraction time, kept in the `runtime_state`
//! key-value table.
//!
//! ## Submodules
//!
//! - `migrations` - Database lifecycle, schema migrations
//! - `state` - Runtime key-value state

use sqlx::sqlite::SqlitePool;

mod migrations;
mod state;

/// Database handle for soundcloud-dl
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
