/// Subscription model: (user, classification) enrollment
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_classifications (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     classification_id UUID NOT NULL REFERENCES classifications(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, classification_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user's enrollment in a classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub user_id: Uuid,
    pub classification_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Inserts the pair unless it already exists
    ///
    /// The primary key arbitrates concurrent subscribe calls, so there is no
    /// check-then-insert window.
    ///
    /// # Returns
    ///
    /// True if a row was inserted, false if the pair was already present
    pub async fn create_if_absent(
        pool: &PgPool,
        user_id: Uuid,
        classification_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_classifications (user_id, classification_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, classification_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(classification_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts rows for a pair (0 or 1)
    pub async fn count_pair(
        pool: &PgPool,
        user_id: Uuid,
        classification_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_classifications WHERE user_id = $1 AND classification_id = $2",
        )
        .bind(user_id)
        .bind(classification_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
