//! Profile repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateProfileInput, Profile};

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create a new profile
    async fn create(&self, input: CreateProfileInput) -> Result<Profile>;

    /// Get a profile by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Profile>>;

    /// Get a profile by username
    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>>;
}

/// Profile repository implementation
pub struct ProfileRepositoryImpl {
    pool: DynDatabasePool,
}

impl ProfileRepositoryImpl {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfileRepositoryImpl {
    async fn create(&self, input: CreateProfileInput) -> Result<Profile> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Profile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_username_sqlite(self.pool.as_sqlite().unwrap(), username).await
            }
            DatabaseDriver::Mysql => {
                get_by_username_mysql(self.pool.as_mysql().unwrap(), username).await
            }
        }
    }
}

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, input: CreateProfileInput) -> Result<Profile> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO profiles (username, full_name, avatar_url, verified, created_at) VALUES (?, ?, ?, 0, ?)",
    )
    .bind(&input.username)
    .bind(&input.full_name)
    .bind(&input.avatar_url)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Profile {
        id: result.last_insert_rowid(),
        username: input.username,
        full_name: input.full_name,
        avatar_url: input.avatar_url,
        verified: false,
        created_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Profile>> {
    let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Profile {
        id: r.get("id"),
        username: r.get("username"),
        full_name: r.get("full_name"),
        avatar_url: r.get("avatar_url"),
        verified: r.get("verified"),
        created_at: r.get("created_at"),
    }))
}

async fn get_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<Profile>> {
    let row = sqlx::query("SELECT * FROM profiles WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Profile {
        id: r.get("id"),
        username: r.get("username"),
        full_name: r.get("full_name"),
        avatar_url: r.get("avatar_url"),
        verified: r.get("verified"),
        created_at: r.get("created_at"),
    }))
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, input: CreateProfileInput) -> Result<Profile> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO profiles (username, full_name, avatar_url, verified, created_at) VALUES (?, ?, ?, FALSE, ?)",
    )
    .bind(&input.username)
    .bind(&input.full_name)
    .bind(&input.avatar_url)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Profile {
        id: result.last_insert_id() as i64,
        username: input.username,
        full_name: input.full_name,
        avatar_url: input.avatar_url,
        verified: false,
        created_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Profile>> {
    let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Profile {
        id: r.get("id"),
        username: r.get("username"),
        full_name: r.get("full_name"),
        avatar_url: r.get("avatar_url"),
        verified: r.get("verified"),
        created_at: r.get("created_at"),
    }))
}

async fn get_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<Profile>> {
    let row = sqlx::query("SELECT * FROM profiles WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Profile {
        id: r.get("id"),
        username: r.get("username"),
        full_name: r.get("full_name"),
        avatar_url: r.get("avatar_url"),
        verified: r.get("verified"),
        created_at: r.get("created_at"),
    }))
}
