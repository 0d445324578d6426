/// In-process store
///
/// Mirrors the PostgreSQL schema closely enough for the engine to be exercised
/// without a database: the same unique and foreign key constraint names, the
/// same cascade on user deletion, and the same result orderings.
///
/// A transaction holds the store's lock for its whole lifetime and works on a
/// copy of the state. Commit swaps the copy in; drop discards it. Concurrent
/// writers therefore serialize exactly like row-locked SQL transactions.
///
/// Reads issued while a transaction is open wait for it to finish, so callers
/// must not read through the store from inside their own transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, StoreTx};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    action::{ActionRecord, NewActionRecord},
    classification::{Classification, CreateClassification, SubscriberCount},
    stat::{ContributionTotal, NewStatContribution, StatContribution},
    subscription::Subscription,
    user::{CreateUser, LeaderboardEntry, User, UserProfile, UserRole},
};

#[derive(Debug, Clone, Default)]
struct State {
    users: Vec<User>,
    classifications: Vec<Classification>,
    subscriptions: Vec<Subscription>,
    actions: Vec<ActionRecord>,
    stats: Vec<StatContribution>,
}

impl State {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn classification(&self, id: Uuid) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.id == id)
    }

    fn insert_action(&mut self, data: NewActionRecord) -> StoreResult<ActionRecord> {
        if self.user(data.user_id).is_none() {
            return Err(StoreError::Constraint("actions_user_id_fkey".to_string()));
        }
        if let Some(cid) = data.classification_id {
            if self.classification(cid).is_none() {
                return Err(StoreError::Constraint(
                    "actions_classification_id_fkey".to_string(),
                ));
            }
        }

        let record = ActionRecord {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            action: data.action,
            points: data.points,
            classification_id: data.classification_id,
            created_at: Utc::now(),
        };
        self.actions.push(record.clone());
        Ok(record)
    }

    fn insert_stat(&mut self, data: NewStatContribution) -> StoreResult<StatContribution> {
        if self.user(data.user_id).is_none() {
            return Err(StoreError::Constraint("stats_user_id_fkey".to_string()));
        }
        if self.classification(data.classification_id).is_none() {
            return Err(StoreError::Constraint(
                "stats_classification_id_fkey".to_string(),
            ));
        }

        let stat = StatContribution {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            classification_id: data.classification_id,
            title: data.title,
            value: data.value,
            category: data.category,
            created_at: Utc::now(),
        };
        self.stats.push(stat.clone());
        Ok(stat)
    }
}

/// Store keeping everything in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.lock().await;

        if state.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::Constraint("users_username_key".to_string()));
        }
        if state.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Constraint("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            role: UserRole::User,
            points: 0,
            level: 1,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.lock().await.user(id).cloned())
    }

    async fn find_user_by_login(&self, identifier: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.lock().await.users.clone())
    }

    async fn top_users_by_points(&self, limit: i64) -> StoreResult<Vec<LeaderboardEntry>> {
        let state = self.state.lock().await;

        // Stable sort keeps creation order on ties
        let mut users: Vec<&User> = state.users.iter().collect();
        users.sort_by(|a, b| b.points.cmp(&a.points));

        Ok(users
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|u| LeaderboardEntry {
                username: u.username.clone(),
                level: u.level,
                points: u.points,
            })
            .collect())
    }

    async fn update_user_role(&self, id: Uuid, role: UserRole) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.user_mut(id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;

        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Ok(false);
        }

        state.actions.retain(|a| a.user_id != id);
        state.stats.retain(|s| s.user_id != id);
        state.subscriptions.retain(|s| s.user_id != id);
        Ok(true)
    }

    async fn user_profile(&self, id: Uuid) -> StoreResult<Option<UserProfile>> {
        let state = self.state.lock().await;
        let Some(user) = state.user(id) else {
            return Ok(None);
        };

        let actions: Vec<&ActionRecord> = state.actions.iter().filter(|a| a.user_id == id).collect();

        Ok(Some(UserProfile {
            username: user.username.clone(),
            email: user.email.clone(),
            total_actions: actions.len() as i64,
            first_action_at: actions.iter().map(|a| a.created_at).min(),
            total_classifications: state
                .subscriptions
                .iter()
                .filter(|s| s.user_id == id)
                .count() as i64,
        }))
    }

    async fn create_classification(&self, data: CreateClassification) -> StoreResult<Classification> {
        let mut state = self.state.lock().await;

        if state.classifications.iter().any(|c| c.name == data.name) {
            return Err(StoreError::Constraint("classifications_name_key".to_string()));
        }

        let classification = Classification {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            created_at: Utc::now(),
        };
        state.classifications.push(classification.clone());
        Ok(classification)
    }

    async fn find_classification(&self, id: Uuid) -> StoreResult<Option<Classification>> {
        Ok(self.state.lock().await.classification(id).cloned())
    }

    async fn find_classification_by_name(&self, name: &str) -> StoreResult<Option<Classification>> {
        let state = self.state.lock().await;
        Ok(state.classifications.iter().find(|c| c.name == name).cloned())
    }

    async fn subscriber_counts(&self) -> StoreResult<Vec<SubscriberCount>> {
        let state = self.state.lock().await;

        let mut counts: Vec<SubscriberCount> = state
            .classifications
            .iter()
            .map(|c| SubscriberCount {
                classification_id: c.id,
                name: c.name.clone(),
                subscribers: state
                    .subscriptions
                    .iter()
                    .filter(|s| s.classification_id == c.id)
                    .count() as i64,
            })
            .collect();

        counts.sort_by(|a, b| b.subscribers.cmp(&a.subscribers).then_with(|| a.name.cmp(&b.name)));
        Ok(counts)
    }

    async fn insert_subscription(&self, user_id: Uuid, classification_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;

        if state.user(user_id).is_none() {
            return Err(StoreError::Constraint(
                "user_classifications_user_id_fkey".to_string(),
            ));
        }
        if state.classification(classification_id).is_none() {
            return Err(StoreError::Constraint(
                "user_classifications_classification_id_fkey".to_string(),
            ));
        }

        let exists = state
            .subscriptions
            .iter()
            .any(|s| s.user_id == user_id && s.classification_id == classification_id);
        if exists {
            return Ok(false);
        }

        state.subscriptions.push(Subscription {
            user_id,
            classification_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn subscribed_classifications(&self, user_id: Uuid) -> StoreResult<Vec<Classification>> {
        let state = self.state.lock().await;
        Ok(state
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter_map(|s| state.classification(s.classification_id).cloned())
            .collect())
    }

    async fn recent_actions(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ActionRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .actions
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_stats(&self) -> StoreResult<Vec<StatContribution>> {
        let state = self.state.lock().await;
        Ok(state.stats.iter().rev().cloned().collect())
    }

    async fn contribution_totals(&self, classification_id: Uuid) -> StoreResult<Vec<ContributionTotal>> {
        let state = self.state.lock().await;

        let mut sums: HashMap<Uuid, f64> = HashMap::new();
        for stat in state.stats.iter().filter(|s| s.classification_id == classification_id) {
            *sums.entry(stat.user_id).or_insert(0.0) += stat.value;
        }

        let mut totals: Vec<ContributionTotal> = sums
            .into_iter()
            .filter_map(|(user_id, total_value)| {
                state.user(user_id).map(|u| ContributionTotal {
                    user_id,
                    username: u.username.clone(),
                    total_value,
                })
            })
            .collect();

        totals.sort_by(|a, b| {
            b.total_value
                .total_cmp(&a.total_value)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(totals)
    }
}

/// Open in-memory transaction
pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn increment_points(&mut self, user_id: Uuid, delta: i64) -> StoreResult<Option<i64>> {
        let Some(user) = self.working.user_mut(user_id) else {
            return Ok(None);
        };

        user.points = user
            .points
            .checked_add(delta)
            .ok_or_else(|| StoreError::OutOfRange("bigint out of range".to_string()))?;
        Ok(Some(user.points))
    }

    async fn set_level(&mut self, user_id: Uuid, level: i32) -> StoreResult<()> {
        if let Some(user) = self.working.user_mut(user_id) {
            user.level = level;
        }
        Ok(())
    }

    async fn insert_action(&mut self, data: NewActionRecord) -> StoreResult<ActionRecord> {
        self.working.insert_action(data)
    }

    async fn insert_stat(&mut self, data: NewStatContribution) -> StoreResult<StatContribution> {
        self.working.insert_stat(data)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
