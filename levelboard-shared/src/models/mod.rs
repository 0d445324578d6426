/// Database models for Levelboard
///
/// Each model owns the SQL for its table. The functions take a `&PgPool` for
/// standalone reads and writes, or a `&mut PgConnection` when they must run
/// inside a ledger transaction.
///
/// # Models
///
/// - `user`: Accounts, roles and the points/level pair
/// - `classification`: Named leaderboards
/// - `subscription`: User-classification enrollment
/// - `action`: Append-only action history
/// - `stat`: Append-only stat contributions and their per-user totals

pub mod action;
pub mod classification;
pub mod stat;
pub mod subscription;
pub mod user;
