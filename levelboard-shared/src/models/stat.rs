/// Stat contribution model
///
/// A stat is one quantified contribution of a user toward a classification.
/// Rankings are computed from the per-user sum of `value`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE stats (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     classification_id UUID NOT NULL REFERENCES classifications(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     value DOUBLE PRECISION NOT NULL,
///     category VARCHAR(100) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Recorded stat contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatContribution {
    pub id: Uuid,
    pub user_id: Uuid,
    pub classification_id: Uuid,
    pub title: String,
    pub value: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a stat contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStatContribution {
    pub user_id: Uuid,
    pub classification_id: Uuid,
    pub title: String,
    pub value: f64,
    pub category: String,
}

/// Summed contribution of one user within a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContributionTotal {
    pub user_id: Uuid,
    pub username: String,
    pub total_value: f64,
}

impl StatContribution {
    /// Appends a stat row
    pub async fn insert(
        conn: &mut PgConnection,
        data: NewStatContribution,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, StatContribution>(
            r#"
            INSERT INTO stats (user_id, classification_id, title, value, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, classification_id, title, value, category, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.classification_id)
        .bind(data.title)
        .bind(data.value)
        .bind(data.category)
        .fetch_one(&mut *conn)
        .await
    }

    /// Lists every stat, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StatContribution>(
            r#"
            SELECT id, user_id, classification_id, title, value, category, created_at
            FROM stats
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Per-user sums of `value` within one classification
    ///
    /// Only users with at least one contribution appear.
    pub async fn totals_for_classification(
        pool: &PgPool,
        classification_id: Uuid,
    ) -> Result<Vec<ContributionTotal>, sqlx::Error> {
        sqlx::query_as::<_, ContributionTotal>(
            r#"
            SELECT s.user_id, u.username, SUM(s.value) AS total_value
            FROM stats s
            JOIN users u ON u.id = s.user_id
            WHERE s.classification_id = $1
            GROUP BY s.user_id, u.username
            ORDER BY total_value DESC, u.username ASC
            "#,
        )
        .bind(classification_id)
        .fetch_all(pool)
        .await
    }
}
