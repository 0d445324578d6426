/// PostgreSQL store
///
/// Thin adapter from the [`Store`] capability to the model queries in
/// [`crate::models`]. Ledger transactions are plain `sqlx` transactions: the
/// points increment holds the user's row lock until commit, and dropping the
/// transaction rolls it back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{Store, StoreTx};
use crate::db::pool::health_check;
use crate::error::StoreResult;
use crate::models::{
    action::{ActionRecord, NewActionRecord},
    classification::{Classification, CreateClassification, SubscriberCount},
    stat::{ContributionTotal, NewStatContribution, StatContribution},
    subscription::Subscription,
    user::{CreateUser, LeaderboardEntry, User, UserProfile, UserRole},
};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTx { tx }))
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_login(&self, identifier: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_login(&self.pool, identifier).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn top_users_by_points(&self, limit: i64) -> StoreResult<Vec<LeaderboardEntry>> {
        Ok(User::top_by_points(&self.pool, limit).await?)
    }

    async fn update_user_role(&self, id: Uuid, role: UserRole) -> StoreResult<bool> {
        Ok(User::update_role(&self.pool, id, role).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn user_profile(&self, id: Uuid) -> StoreResult<Option<UserProfile>> {
        Ok(User::profile(&self.pool, id).await?)
    }

    async fn create_classification(&self, data: CreateClassification) -> StoreResult<Classification> {
        Ok(Classification::create(&self.pool, data).await?)
    }

    async fn find_classification(&self, id: Uuid) -> StoreResult<Option<Classification>> {
        Ok(Classification::find_by_id(&self.pool, id).await?)
    }

    async fn find_classification_by_name(&self, name: &str) -> StoreResult<Option<Classification>> {
        Ok(Classification::find_by_name(&self.pool, name).await?)
    }

    async fn subscriber_counts(&self) -> StoreResult<Vec<SubscriberCount>> {
        Ok(Classification::subscriber_counts(&self.pool).await?)
    }

    async fn insert_subscription(&self, user_id: Uuid, classification_id: Uuid) -> StoreResult<bool> {
        Ok(Subscription::create_if_absent(&self.pool, user_id, classification_id).await?)
    }

    async fn subscribed_classifications(&self, user_id: Uuid) -> StoreResult<Vec<Classification>> {
        Ok(Classification::list_subscribed(&self.pool, user_id).await?)
    }

    async fn recent_actions(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ActionRecord>> {
        Ok(ActionRecord::recent_for_user(&self.pool, user_id, limit).await?)
    }

    async fn list_stats(&self) -> StoreResult<Vec<StatContribution>> {
        Ok(StatContribution::list(&self.pool).await?)
    }

    async fn contribution_totals(&self, classification_id: Uuid) -> StoreResult<Vec<ContributionTotal>> {
        Ok(StatContribution::totals_for_classification(&self.pool, classification_id).await?)
    }
}

/// Open PostgreSQL transaction
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn increment_points(&mut self, user_id: Uuid, delta: i64) -> StoreResult<Option<i64>> {
        Ok(User::increment_points(&mut self.tx, user_id, delta).await?)
    }

    async fn set_level(&mut self, user_id: Uuid, level: i32) -> StoreResult<()> {
        User::set_level(&mut self.tx, user_id, level).await?;
        Ok(())
    }

    async fn insert_action(&mut self, data: NewActionRecord) -> StoreResult<ActionRecord> {
        Ok(ActionRecord::insert(&mut self.tx, data).await?)
    }

    async fn insert_stat(&mut self, data: NewStatContribution) -> StoreResult<StatContribution> {
        Ok(StatContribution::insert(&mut self.tx, data).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
