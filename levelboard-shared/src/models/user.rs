/// User model and database operations
///
/// Users carry the points/level pair maintained by the points ledger.
/// The level column is always written together with the points column inside
/// one transaction, see [`crate::ledger`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(64) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'user',
///     points BIGINT NOT NULL DEFAULT 0,
///     level INTEGER NOT NULL DEFAULT 1 CHECK (level BETWEEN 1 AND 999),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use levelboard_shared::models::user::{User, CreateUser};
/// use levelboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// assert_eq!(user.points, 0);
/// assert_eq!(user.level, 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account
    User,

    /// Can adjust points, change roles, delete users and manage classifications
    Admin,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Public display name, unique
    pub username: String,

    /// Email address, unique
    pub email: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Account role
    pub role: UserRole,

    /// Accumulated points
    pub points: i64,

    /// Level derived from `points`
    pub level: i32,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Row of the global points leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub level: i32,
    pub points: i64,
}

/// Profile summary: activity counters for one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub username: String,
    pub email: String,

    /// Number of recorded actions
    pub total_actions: i64,

    /// Timestamp of the first recorded action
    pub first_action_at: Option<DateTime<Utc>>,

    /// Number of subscribed classifications
    pub total_classifications: i64,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, points, level, created_at";

impl User {
    /// Creates a new user with zero points, level 1 and the `user` role
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email is taken (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by username or email
    ///
    /// Login accepts either, so both columns are matched against the same
    /// identifier.
    pub async fn find_by_login(pool: &PgPool, identifier: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1 LIMIT 1",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users ORDER BY created_at ASC, id ASC", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Top users by points
    ///
    /// Ties are broken by account age, then by id, so the order is stable.
    pub async fn top_by_points(pool: &PgPool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT username, level, points
            FROM users
            ORDER BY points DESC, created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Atomically adds `delta` to a user's points
    ///
    /// Runs as a single `points = points + delta` statement, which takes the
    /// row lock until the surrounding transaction ends.
    ///
    /// # Returns
    ///
    /// The new total, or None if the user doesn't exist
    pub async fn increment_points(
        conn: &mut PgConnection,
        id: Uuid,
        delta: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let total: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET points = points + $1
            WHERE id = $2
            RETURNING points
            "#,
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(total.map(|(points,)| points))
    }

    /// Writes the derived level
    pub async fn set_level(conn: &mut PgConnection, id: Uuid, level: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET level = $1 WHERE id = $2")
            .bind(level)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Changes a user's role
    ///
    /// # Returns
    ///
    /// True if the user was found and updated
    pub async fn update_role(pool: &PgPool, id: Uuid, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// ⚠️  Cascades to the user's actions, stats and subscriptions.
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Builds the profile summary for a user
    pub async fn profile(pool: &PgPool, id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT
                u.username,
                u.email,
                (SELECT COUNT(*) FROM actions a WHERE a.user_id = u.id) AS total_actions,
                (SELECT MIN(a.created_at) FROM actions a WHERE a.user_id = u.id) AS first_action_at,
                (SELECT COUNT(*) FROM user_classifications uc WHERE uc.user_id = u.id) AS total_classifications
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
