/// Classification model and database operations
///
/// A classification is a named leaderboard. The name is the lookup key used
/// when submitting stats, so it is unique.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE classifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL UNIQUE,
///     description TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Classification (leaderboard) definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Classification {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassification {
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Distinct subscriber count of one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubscriberCount {
    pub classification_id: Uuid,
    pub name: String,
    pub subscribers: i64,
}

impl Classification {
    /// Creates a classification
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken
    pub async fn create(pool: &PgPool, data: CreateClassification) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Classification>(
            r#"
            INSERT INTO classifications (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Finds a classification by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Classification>(
            "SELECT id, name, description, created_at FROM classifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a classification by its exact name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Classification>(
            "SELECT id, name, description, created_at FROM classifications WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Lists the classifications a user is subscribed to
    pub async fn list_subscribed(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Classification>(
            r#"
            SELECT c.id, c.name, c.description, c.created_at
            FROM classifications c
            JOIN user_classifications uc ON uc.classification_id = c.id
            WHERE uc.user_id = $1
            ORDER BY uc.created_at ASC, c.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Distinct subscriber counts for every classification
    ///
    /// Classifications without subscribers are included with a count of 0.
    pub async fn subscriber_counts(pool: &PgPool) -> Result<Vec<SubscriberCount>, sqlx::Error> {
        sqlx::query_as::<_, SubscriberCount>(
            r#"
            SELECT c.id AS classification_id, c.name, COUNT(DISTINCT uc.user_id) AS subscribers
            FROM classifications c
            LEFT JOIN user_classifications uc ON uc.classification_id = c.id
            GROUP BY c.id, c.name
            ORDER BY subscribers DESC, c.name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
