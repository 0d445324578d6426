/// Classification ranking engine
///
/// Read-only views over points and stat contributions. A user's value in a
/// classification is the sum of their contributions to it; positions use
/// competition ranking, so tied totals share a position and the next distinct
/// total skips ahead (1, 1, 3).
///
/// Rankings are computed from whatever the store returns at call time. Views
/// assembled from several reads can observe a state between two concurrent
/// ledger commits.

use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::stat::ContributionTotal;
use crate::models::user::LeaderboardEntry;
use crate::store::Store;

/// Default ranking length of the classification views
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// One row of a classification ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based competition rank
    pub position: usize,
    pub user_id: Uuid,
    pub username: String,
    pub total_value: f64,
}

/// A user's place within one classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standing {
    /// Summed contribution value, 0 without contributions
    pub value: f64,

    /// None when the user has not contributed
    pub position: Option<usize>,

    /// Number of users with at least one contribution
    pub total_participants: usize,
}

/// Standing of a user in one of their subscribed classifications
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationStanding {
    pub classification_id: Uuid,
    pub classification: String,
    pub value: f64,
    pub position: Option<usize>,
    pub total_users: usize,
}

/// Classification with its subscriber count and leading contributor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularClassification {
    pub id: Uuid,
    pub name: String,
    pub subscribers: i64,
    pub top_user: Option<RankedEntry>,
}

/// Classification with its ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDetails {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub ranking: Vec<RankedEntry>,
}

/// Relative tolerance under which two totals count as a tie
///
/// Sums of the same values in a different order can differ in the last bits
/// (`0.1 + 0.2` against `0.3`).
pub const TIE_TOLERANCE: f64 = 1e-9;

fn same_total(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Sorts per-user totals and assigns positions
///
/// Order is total descending, then username, then user id. Position is one
/// plus the number of users with a greater total; totals within
/// [`TIE_TOLERANCE`] of the first total of their group share its position.
pub fn rank_totals(mut totals: Vec<ContributionTotal>) -> Vec<RankedEntry> {
    totals.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));

    let mut ranked: Vec<RankedEntry> = Vec::with_capacity(totals.len());
    let mut group_total = f64::NAN;
    let mut group_position = 0;

    for (index, total) in totals.into_iter().enumerate() {
        if index == 0 || !same_total(group_total, total.total_value) {
            group_total = total.total_value;
            group_position = index + 1;
        }

        ranked.push(RankedEntry {
            position: group_position,
            user_id: total.user_id,
            username: total.username,
            total_value: total.total_value,
        });
    }

    ranked.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.username.cmp(&b.username))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    ranked
}

/// Computes rankings and leaderboards
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn Store>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Top `n` users by points
    pub async fn top_n(&self, n: i64) -> CoreResult<Vec<LeaderboardEntry>> {
        tracing::debug!(n, "Loading points leaderboard");
        Ok(self.store.top_users_by_points(n).await?)
    }

    /// Full ranking of a classification, optionally truncated
    ///
    /// Truncation keeps positions computed over all participants.
    pub async fn ranking_for_classification(
        &self,
        classification_id: Uuid,
        limit: Option<usize>,
    ) -> CoreResult<Vec<RankedEntry>> {
        let totals = self.store.contribution_totals(classification_id).await?;
        let mut ranked = rank_totals(totals);

        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        Ok(ranked)
    }

    /// A user's value and position in a classification
    pub async fn user_standing(&self, user_id: Uuid, classification_id: Uuid) -> CoreResult<Standing> {
        let ranked = self.ranking_for_classification(classification_id, None).await?;

        let standing = match ranked.iter().find(|entry| entry.user_id == user_id) {
            Some(entry) => Standing {
                value: entry.total_value,
                position: Some(entry.position),
                total_participants: ranked.len(),
            },
            None => Standing {
                value: 0.0,
                position: None,
                total_participants: ranked.len(),
            },
        };
        Ok(standing)
    }

    /// Standings across every classification the user is subscribed to
    ///
    /// # Errors
    ///
    /// `NotFound` if the user doesn't exist
    pub async fn classifications_for_user(&self, user_id: Uuid) -> CoreResult<Vec<ClassificationStanding>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("User {}", user_id)));
        }

        let subscribed = self.store.subscribed_classifications(user_id).await?;

        try_join_all(subscribed.into_iter().map(|classification| async move {
            let standing = self.user_standing(user_id, classification.id).await?;
            Ok::<_, CoreError>(ClassificationStanding {
                classification_id: classification.id,
                classification: classification.name,
                value: standing.value,
                position: standing.position,
                total_users: standing.total_participants,
            })
        }))
        .await
    }

    /// Most-subscribed classifications with their top contributor
    pub async fn top_classifications_by_subscribers(&self, limit: usize) -> CoreResult<Vec<PopularClassification>> {
        let mut counts = self.store.subscriber_counts().await?;
        counts.truncate(limit);

        try_join_all(counts.into_iter().map(|count| async move {
            let top_user = self
                .ranking_for_classification(count.classification_id, Some(1))
                .await?
                .into_iter()
                .next();

            Ok::<_, CoreError>(PopularClassification {
                id: count.classification_id,
                name: count.name,
                subscribers: count.subscribers,
                top_user,
            })
        }))
        .await
    }

    /// Classification with its ranking (10 entries unless `limit` is given)
    ///
    /// # Errors
    ///
    /// `NotFound` if the classification doesn't exist
    pub async fn classification_details(
        &self,
        classification_id: Uuid,
        limit: Option<usize>,
    ) -> CoreResult<ClassificationDetails> {
        let classification = self
            .store
            .find_classification(classification_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Classification {}", classification_id)))?;

        let ranking = self
            .ranking_for_classification(classification.id, Some(limit.unwrap_or(DEFAULT_RANKING_LIMIT)))
            .await?;

        Ok(ClassificationDetails {
            id: classification.id,
            name: classification.name,
            description: classification.description,
            ranking,
        })
    }
}
