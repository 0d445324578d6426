//! # Levelboard Shared Library
//!
//! Domain types, persistence and the points/ranking engine shared by the
//! Levelboard API server and its tests.
//!
//! ## Module Organization
//!
//! - `leveling`: Pure points <-> level arithmetic
//! - `ledger`: Points ledger (point deltas, action history, level refresh)
//! - `ranking`: Classification rankings and leaderboards
//! - `subscriptions`: Classification enrollment
//! - `store`: Storage capability with PostgreSQL and in-memory backends
//! - `models`: Database models and their queries
//! - `auth`: Password hashing, JWT and request auth context
//! - `db`: Connection pool and migrations
//! - `error`: Core and storage error types

pub mod auth;
pub mod db;
pub mod error;
pub mod ledger;
pub mod leveling;
pub mod models;
pub mod ranking;
pub mod store;
pub mod subscriptions;

/// Current version of the Levelboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
