/// Points ledger
///
/// Every way a user gains or loses points goes through [`PointsLedger`]. Each
/// operation is one store transaction that
///
/// 1. atomically increments the user's points,
/// 2. appends history rows (action, and for stats the contribution),
/// 3. writes the level derived from the post-increment total,
///
/// and commits. Any failing step drops the transaction, which rolls it back,
/// so a user's stored level always matches their stored points and no history
/// row exists without its point award.
///
/// # Award table
///
/// | Action     | Points |
/// |------------|--------|
/// | `like`     | 5      |
/// | `comment`  | 10     |
/// | `share`    | 15     |
/// | `new_stat` | 20     |
///
/// # Example
///
/// ```no_run
/// use levelboard_shared::ledger::{ActionKind, PointsLedger};
/// use levelboard_shared::store::{memory::MemoryStore, Store};
/// use std::sync::Arc;
///
/// # async fn example(user_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let ledger = PointsLedger::new(store);
///
/// let outcome = ledger.record_action(user_id, ActionKind::Like).await?;
/// assert_eq!(outcome.points_awarded, 5);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::leveling::level_from_points;
use crate::models::action::{ActionRecord, NewActionRecord};
use crate::models::stat::{NewStatContribution, StatContribution};
use crate::store::{Store, StoreTx};

/// Default size of the recent action history
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Action that awards a fixed number of points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Like,
    NewStat,
    Comment,
    Share,
}

impl ActionKind {
    /// Points awarded for this action
    pub fn points(&self) -> i64 {
        match self {
            ActionKind::Like => 5,
            ActionKind::NewStat => 20,
            ActionKind::Comment => 10,
            ActionKind::Share => 15,
        }
    }

    /// Label stored in the action history
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::NewStat => "new_stat",
            ActionKind::Comment => "comment",
            ActionKind::Share => "share",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ActionKind::Like),
            "new_stat" => Ok(ActionKind::NewStat),
            "comment" => Ok(ActionKind::Comment),
            "share" => Ok(ActionKind::Share),
            other => Err(CoreError::InvalidAction(other.to_string())),
        }
    }
}

/// Result of a direct point adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointsUpdate {
    pub total_points: i64,
    pub level: i32,
}

/// Result of a recorded action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub action: ActionRecord,
    pub points_awarded: i64,
    pub total_points: i64,
    pub level: i32,
}

/// Stat submission input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStat {
    /// Classification name
    pub classification: String,
    pub title: String,
    pub value: f64,
    pub category: String,
}

/// Result of a stat submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatOutcome {
    pub stat: StatContribution,
    pub points_awarded: i64,
    pub total_points: i64,
    pub level: i32,
}

/// Applies the point award and level refresh inside an open transaction
///
/// Returns the new total and level, or `NotFound` if the user doesn't exist.
async fn apply_delta(tx: &mut dyn StoreTx, user_id: Uuid, delta: i64) -> CoreResult<PointsUpdate> {
    let total_points = tx
        .increment_points(user_id, delta)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("User {}", user_id)))?;

    let level = level_from_points(total_points);
    tx.set_level(user_id, level).await?;

    Ok(PointsUpdate { total_points, level })
}

/// Applies point deltas and records the history behind them
#[derive(Clone)]
pub struct PointsLedger {
    store: Arc<dyn Store>,
}

impl PointsLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Adds `delta` (possibly negative) to a user's points
    ///
    /// Direct adjustments are not recorded in the action history.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user doesn't exist; nothing is written.
    pub async fn add_points(&self, user_id: Uuid, delta: i64) -> CoreResult<PointsUpdate> {
        let mut tx = self.store.begin().await?;
        let update = apply_delta(tx.as_mut(), user_id, delta).await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            delta,
            total_points = update.total_points,
            level = update.level,
            "Points adjusted"
        );

        Ok(update)
    }

    /// Awards the points of an action and appends it to the history
    ///
    /// # Errors
    ///
    /// `NotFound` if the user doesn't exist; nothing is written.
    pub async fn record_action(&self, user_id: Uuid, kind: ActionKind) -> CoreResult<ActionOutcome> {
        let points = kind.points();

        let mut tx = self.store.begin().await?;
        let update = apply_delta(tx.as_mut(), user_id, points).await?;
        let action = tx
            .insert_action(NewActionRecord {
                user_id,
                action: kind.as_str().to_string(),
                points,
                classification_id: None,
            })
            .await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            action = %kind,
            points,
            total_points = update.total_points,
            level = update.level,
            "Action recorded"
        );

        Ok(ActionOutcome {
            action,
            points_awarded: points,
            total_points: update.total_points,
            level: update.level,
        })
    }

    /// Records an action given by its label
    ///
    /// # Errors
    ///
    /// `InvalidAction` for labels outside the award table, before any write.
    pub async fn record_action_named(&self, user_id: Uuid, action: &str) -> CoreResult<ActionOutcome> {
        let kind = action.parse::<ActionKind>()?;
        self.record_action(user_id, kind).await
    }

    /// Submits a stat contribution and awards the `new_stat` points
    ///
    /// The classification is resolved by name before the transaction opens.
    /// Inside it, the increment, the contribution, the tagged `new_stat`
    /// action and the level write commit together.
    ///
    /// # Errors
    ///
    /// - `InvalidClassification` if no classification has that name
    /// - `NotFound` if the user doesn't exist
    pub async fn submit_stat(&self, user_id: Uuid, stat: NewStat) -> CoreResult<StatOutcome> {
        let classification = self
            .store
            .find_classification_by_name(&stat.classification)
            .await?
            .ok_or_else(|| CoreError::InvalidClassification(stat.classification.clone()))?;

        let points = ActionKind::NewStat.points();

        let mut tx = self.store.begin().await?;
        let update = apply_delta(tx.as_mut(), user_id, points).await?;
        let contribution = tx
            .insert_stat(NewStatContribution {
                user_id,
                classification_id: classification.id,
                title: stat.title,
                value: stat.value,
                category: stat.category,
            })
            .await?;
        tx.insert_action(NewActionRecord {
            user_id,
            action: ActionKind::NewStat.as_str().to_string(),
            points,
            classification_id: Some(classification.id),
        })
        .await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            classification = %classification.name,
            value = contribution.value,
            total_points = update.total_points,
            level = update.level,
            "Stat submitted"
        );

        Ok(StatOutcome {
            stat: contribution,
            points_awarded: points,
            total_points: update.total_points,
            level: update.level,
        })
    }

    /// Most recent actions of a user, newest first
    pub async fn recent_actions(&self, user_id: Uuid, limit: Option<i64>) -> CoreResult<Vec<ActionRecord>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self.store.recent_actions(user_id, limit).await?)
    }
}
