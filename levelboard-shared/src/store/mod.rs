/// Storage capability
///
/// The engine never talks to a global connection. Each component receives an
/// `Arc<dyn Store>` and performs its reads through it; multi-step writes go
/// through a [`StoreTx`] obtained from [`Store::begin`], which commits all of
/// its steps at once or none of them.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: process-local state (tests, demos)
///
/// # Example
///
/// ```no_run
/// use levelboard_shared::store::{memory::MemoryStore, Store};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
///
/// let mut tx = store.begin().await?;
/// let total = tx.increment_points(Uuid::new_v4(), 5).await?;
/// assert!(total.is_none()); // unknown user
/// // dropping `tx` without commit discards it
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    action::{ActionRecord, NewActionRecord},
    classification::{Classification, CreateClassification, SubscriberCount},
    stat::{ContributionTotal, NewStatContribution, StatContribution},
    user::{CreateUser, LeaderboardEntry, User, UserProfile, UserRole},
};

pub mod memory;
pub mod postgres;

/// Read access and single-statement writes
#[async_trait]
pub trait Store: Send + Sync {
    /// Verifies the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Starts a unit of work for multi-step writes
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks a user up by username or email
    async fn find_user_by_login(&self, identifier: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Users by points descending, stable on ties
    async fn top_users_by_points(&self, limit: i64) -> StoreResult<Vec<LeaderboardEntry>>;

    /// Returns false if the user doesn't exist
    async fn update_user_role(&self, id: Uuid, role: UserRole) -> StoreResult<bool>;

    /// Returns false if the user doesn't exist
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn user_profile(&self, id: Uuid) -> StoreResult<Option<UserProfile>>;

    async fn create_classification(&self, data: CreateClassification) -> StoreResult<Classification>;

    async fn find_classification(&self, id: Uuid) -> StoreResult<Option<Classification>>;

    async fn find_classification_by_name(&self, name: &str) -> StoreResult<Option<Classification>>;

    /// Distinct subscriber count of every classification
    async fn subscriber_counts(&self) -> StoreResult<Vec<SubscriberCount>>;

    /// Inserts the pair; false if it already existed
    async fn insert_subscription(&self, user_id: Uuid, classification_id: Uuid) -> StoreResult<bool>;

    async fn subscribed_classifications(&self, user_id: Uuid) -> StoreResult<Vec<Classification>>;

    /// Newest-first action history
    async fn recent_actions(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ActionRecord>>;

    async fn list_stats(&self) -> StoreResult<Vec<StatContribution>>;

    /// Per-user value sums for one classification
    async fn contribution_totals(&self, classification_id: Uuid) -> StoreResult<Vec<ContributionTotal>>;
}

/// Transactional writes of the points ledger
///
/// Dropping a transaction without calling [`StoreTx::commit`] rolls it back.
#[async_trait]
pub trait StoreTx: Send {
    /// Atomically adds `delta` to the user's points
    ///
    /// Returns the new total, or None if the user doesn't exist. Concurrent
    /// transactions touching the same user serialize on this call.
    async fn increment_points(&mut self, user_id: Uuid, delta: i64) -> StoreResult<Option<i64>>;

    async fn set_level(&mut self, user_id: Uuid, level: i32) -> StoreResult<()>;

    async fn insert_action(&mut self, data: NewActionRecord) -> StoreResult<ActionRecord>;

    async fn insert_stat(&mut self, data: NewStatContribution) -> StoreResult<StatContribution>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
