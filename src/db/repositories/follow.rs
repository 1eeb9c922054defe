//! Follow repository
//!
//! Query surface over the `followers` table, plus the profile-decorated
//! list queries. Edge creation relies on the unique index over
//! (follower_id, following_id): a duplicate insert affects zero rows
//! instead of erroring, which keeps concurrent duplicate follows safe
//! without a read-then-write check.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{mysql::MySqlRow, MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{FollowerEntry, FollowingEntry, Profile};

/// Follow repository trait
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert a follow edge; returns false if the edge already existed
    async fn insert_edge(&self, follower_id: i64, following_id: i64) -> Result<bool>;

    /// Delete a follow edge; returns false if no edge matched
    async fn delete_edge(&self, follower_id: i64, following_id: i64) -> Result<bool>;

    /// Check whether a follow edge exists
    async fn edge_exists(&self, follower_id: i64, following_id: i64) -> Result<bool>;

    /// Number of users following `user_id`
    async fn follower_count(&self, user_id: i64) -> Result<i64>;

    /// Number of users `user_id` follows
    async fn following_count(&self, user_id: i64) -> Result<i64>;

    /// Followers of `user_id` with profiles, most recent edge first
    async fn followers(&self, user_id: i64) -> Result<Vec<FollowerEntry>>;

    /// Users `user_id` follows with profiles, most recent edge first
    async fn following(&self, user_id: i64) -> Result<Vec<FollowingEntry>>;

    /// Profiles `user_id` does not follow and is not, capped at `limit`
    async fn suggestions(&self, user_id: i64, limit: i64) -> Result<Vec<Profile>>;
}

/// Follow repository implementation
pub struct FollowRepositoryImpl {
    pool: DynDatabasePool,
}

impl FollowRepositoryImpl {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for FollowRepositoryImpl {
    async fn insert_edge(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                insert_edge_sqlite(self.pool.as_sqlite().unwrap(), follower_id, following_id).await
            }
            DatabaseDriver::Mysql => {
                insert_edge_mysql(self.pool.as_mysql().unwrap(), follower_id, following_id).await
            }
        }
    }

    async fn delete_edge(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_edge_sqlite(self.pool.as_sqlite().unwrap(), follower_id, following_id).await
            }
            DatabaseDriver::Mysql => {
                delete_edge_mysql(self.pool.as_mysql().unwrap(), follower_id, following_id).await
            }
        }
    }

    async fn edge_exists(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                edge_exists_sqlite(self.pool.as_sqlite().unwrap(), follower_id, following_id).await
            }
            DatabaseDriver::Mysql => {
                edge_exists_mysql(self.pool.as_mysql().unwrap(), follower_id, following_id).await
            }
        }
    }

    async fn follower_count(&self, user_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "SELECT COUNT(*) FROM followers WHERE following_id = ?",
                    user_id,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                count_mysql(
                    self.pool.as_mysql().unwrap(),
                    "SELECT COUNT(*) FROM followers WHERE following_id = ?",
                    user_id,
                )
                .await
            }
        }
    }

    async fn following_count(&self, user_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "SELECT COUNT(*) FROM followers WHERE follower_id = ?",
                    user_id,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                count_mysql(
                    self.pool.as_mysql().unwrap(),
                    "SELECT COUNT(*) FROM followers WHERE follower_id = ?",
                    user_id,
                )
                .await
            }
        }
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<FollowerEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                followers_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => followers_mysql(self.pool.as_mysql().unwrap(), user_id).await,
        }
    }

    async fn following(&self, user_id: i64) -> Result<Vec<FollowingEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                following_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => following_mysql(self.pool.as_mysql().unwrap(), user_id).await,
        }
    }

    async fn suggestions(&self, user_id: i64, limit: i64) -> Result<Vec<Profile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                suggestions_sqlite(self.pool.as_sqlite().unwrap(), user_id, limit).await
            }
            DatabaseDriver::Mysql => {
                suggestions_mysql(self.pool.as_mysql().unwrap(), user_id, limit).await
            }
        }
    }
}

const FOLLOWERS_SQL: &str = r#"SELECT f.follower_id, f.created_at AS followed_at, p.*
    FROM followers f
    JOIN profiles p ON p.id = f.follower_id
    WHERE f.following_id = ?
    ORDER BY f.created_at DESC"#;

const FOLLOWING_SQL: &str = r#"SELECT f.following_id, f.created_at AS followed_at, p.*
    FROM followers f
    JOIN profiles p ON p.id = f.following_id
    WHERE f.follower_id = ?
    ORDER BY f.created_at DESC"#;

const SUGGESTIONS_SQL: &str = r#"SELECT * FROM profiles
    WHERE id <> ?
      AND id NOT IN (SELECT following_id FROM followers WHERE follower_id = ?)
    LIMIT ?"#;

// SQLite implementations

fn profile_from_sqlite_row(row: &SqliteRow) -> Profile {
    Profile {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        avatar_url: row.get("avatar_url"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
    }
}

async fn insert_edge_sqlite(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO followers (follower_id, following_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(follower_id)
    .bind(following_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn delete_edge_sqlite(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM followers WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn edge_exists_sqlite(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM followers WHERE follower_id = ? AND following_id = ?",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

async fn count_sqlite(pool: &SqlitePool, sql: &str, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(sql).bind(user_id).fetch_one(pool).await?;
    Ok(count)
}

async fn followers_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Vec<FollowerEntry>> {
    let rows = sqlx::query(FOLLOWERS_SQL)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| FollowerEntry {
            follower_id: row.get("follower_id"),
            created_at: row.get("followed_at"),
            profile: profile_from_sqlite_row(row),
        })
        .collect())
}

async fn following_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Vec<FollowingEntry>> {
    let rows = sqlx::query(FOLLOWING_SQL)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| FollowingEntry {
            following_id: row.get("following_id"),
            created_at: row.get("followed_at"),
            profile: profile_from_sqlite_row(row),
        })
        .collect())
}

async fn suggestions_sqlite(pool: &SqlitePool, user_id: i64, limit: i64) -> Result<Vec<Profile>> {
    let rows = sqlx::query(SUGGESTIONS_SQL)
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(profile_from_sqlite_row).collect())
}

// MySQL implementations

fn profile_from_mysql_row(row: &MySqlRow) -> Profile {
    Profile {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        avatar_url: row.get("avatar_url"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
    }
}

async fn insert_edge_mysql(pool: &MySqlPool, follower_id: i64, following_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "INSERT IGNORE INTO followers (follower_id, following_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(follower_id)
    .bind(following_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn delete_edge_mysql(pool: &MySqlPool, follower_id: i64, following_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM followers WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn edge_exists_mysql(pool: &MySqlPool, follower_id: i64, following_id: i64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM followers WHERE follower_id = ? AND following_id = ?",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

async fn count_mysql(pool: &MySqlPool, sql: &str, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(sql).bind(user_id).fetch_one(pool).await?;
    Ok(count)
}

async fn followers_mysql(pool: &MySqlPool, user_id: i64) -> Result<Vec<FollowerEntry>> {
    let rows = sqlx::query(FOLLOWERS_SQL)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| FollowerEntry {
            follower_id: row.get("follower_id"),
            created_at: row.get("followed_at"),
            profile: profile_from_mysql_row(row),
        })
        .collect())
}

async fn following_mysql(pool: &MySqlPool, user_id: i64) -> Result<Vec<FollowingEntry>> {
    let rows = sqlx::query(FOLLOWING_SQL)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| FollowingEntry {
            following_id: row.get("following_id"),
            created_at: row.get("followed_at"),
            profile: profile_from_mysql_row(row),
        })
        .collect())
}

async fn suggestions_mysql(pool: &MySqlPool, user_id: i64, limit: i64) -> Result<Vec<Profile>> {
    let rows = sqlx::query(SUGGESTIONS_SQL)
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(profile_from_mysql_row).collect())
}
