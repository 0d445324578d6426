/// Action history model
///
/// Every point award is recorded as an append-only action row. Rows are
/// inserted inside the ledger transaction that moves the points and are never
/// updated afterwards.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE actions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     classification_id UUID REFERENCES classifications(id) ON DELETE SET NULL,
///     action VARCHAR(64) NOT NULL,
///     points BIGINT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Recorded action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActionRecord {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Action label (e.g. "like", "new_stat")
    pub action: String,

    /// Points awarded for this action
    pub points: i64,

    /// Classification the action relates to, if any
    pub classification_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Input for appending an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActionRecord {
    pub user_id: Uuid,
    pub action: String,
    pub points: i64,
    pub classification_id: Option<Uuid>,
}

impl ActionRecord {
    /// Appends an action row
    pub async fn insert(conn: &mut PgConnection, data: NewActionRecord) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ActionRecord>(
            r#"
            INSERT INTO actions (user_id, action, points, classification_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, action, points, classification_id, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.action)
        .bind(data.points)
        .bind(data.classification_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Most recent actions of a user, newest first
    pub async fn recent_for_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActionRecord>(
            r#"
            SELECT id, user_id, action, points, classification_id, created_at
            FROM actions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
