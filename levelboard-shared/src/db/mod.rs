/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health check and stats
/// - `migrations`: Embedded schema migrations
///
/// Table access lives in [`crate::models`]; the engine reaches it through
/// [`crate::store::postgres::PgStore`].

pub mod migrations;
pub mod pool;
