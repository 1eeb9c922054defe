//! Booking repository
//!
//! Covers the two tables the availability checks read: `bookings` and
//! `service_unavailable_dates`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{mysql::MySqlRow, MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{
    Booking, BookingStatus, CreateBookingInput, CreateUnavailableDateInput, Guests,
    UnavailableDate,
};

/// Booking repository trait
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Create a new booking (status starts as pending)
    async fn create(&self, input: CreateBookingInput) -> Result<Booking>;

    /// Update a booking's status
    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<bool>;

    /// Confirmed bookings for a resource on a single date
    async fn confirmed_on_date(
        &self,
        service_id: i64,
        service_category: &str,
        date: NaiveDate,
    ) -> Result<Vec<Booking>>;

    /// Confirmed bookings for a resource within an inclusive date range
    async fn confirmed_in_range(
        &self,
        service_id: i64,
        service_category: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Booking>>;

    /// All explicit block records for a resource
    async fn unavailable_dates(
        &self,
        service_id: i64,
        service_category: &str,
    ) -> Result<Vec<UnavailableDate>>;

    /// Block records matching a resource and date, optionally slot-filtered
    async fn find_blocks(
        &self,
        service_id: i64,
        service_category: &str,
        date: NaiveDate,
        time_slot: Option<&str>,
    ) -> Result<Vec<UnavailableDate>>;

    /// Add a provider-declared block
    async fn add_unavailable_date(
        &self,
        input: CreateUnavailableDateInput,
    ) -> Result<UnavailableDate>;

    /// Remove a block by id
    async fn remove_unavailable_date(&self, id: i64) -> Result<bool>;
}

/// Booking repository implementation
pub struct BookingRepositoryImpl {
    pool: DynDatabasePool,
}

impl BookingRepositoryImpl {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, input: CreateBookingInput) -> Result<Booking> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_status_sqlite(self.pool.as_sqlite().unwrap(), id, status).await
            }
            DatabaseDriver::Mysql => {
                update_status_mysql(self.pool.as_mysql().unwrap(), id, status).await
            }
        }
    }

    async fn confirmed_on_date(
        &self,
        service_id: i64,
        service_category: &str,
        date: NaiveDate,
    ) -> Result<Vec<Booking>> {
        self.confirmed_in_range(service_id, service_category, date, date)
            .await
    }

    async fn confirmed_in_range(
        &self,
        service_id: i64,
        service_category: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Booking>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                confirmed_in_range_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    service_id,
                    service_category,
                    start_date,
                    end_date,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                confirmed_in_range_mysql(
                    self.pool.as_mysql().unwrap(),
                    service_id,
                    service_category,
                    start_date,
                    end_date,
                )
                .await
            }
        }
    }

    async fn unavailable_dates(
        &self,
        service_id: i64,
        service_category: &str,
    ) -> Result<Vec<UnavailableDate>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                unavailable_dates_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    service_id,
                    service_category,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                unavailable_dates_mysql(self.pool.as_mysql().unwrap(), service_id, service_category)
                    .await
            }
        }
    }

    async fn find_blocks(
        &self,
        service_id: i64,
        service_category: &str,
        date: NaiveDate,
        time_slot: Option<&str>,
    ) -> Result<Vec<UnavailableDate>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                find_blocks_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    service_id,
                    service_category,
                    date,
                    time_slot,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                find_blocks_mysql(
                    self.pool.as_mysql().unwrap(),
                    service_id,
                    service_category,
                    date,
                    time_slot,
                )
                .await
            }
        }
    }

    async fn add_unavailable_date(
        &self,
        input: CreateUnavailableDateInput,
    ) -> Result<UnavailableDate> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_unavailable_date_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Mysql => {
                add_unavailable_date_mysql(self.pool.as_mysql().unwrap(), input).await
            }
        }
    }

    async fn remove_unavailable_date(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_unavailable_date_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                remove_unavailable_date_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }
}

/// Build an optional guest record from the three nullable columns
fn guests_from_columns(
    adults: Option<i64>,
    children: Option<i64>,
    infants: Option<i64>,
) -> Option<Guests> {
    if adults.is_none() && children.is_none() && infants.is_none() {
        return None;
    }
    Some(Guests {
        adults: adults.unwrap_or(0),
        children: children.unwrap_or(0),
        infants: infants.unwrap_or(0),
    })
}

// SQLite implementations

fn booking_from_sqlite_row(row: &SqliteRow) -> Booking {
    Booking {
        id: row.get("id"),
        service_id: row.get("service_id"),
        service_category: row.get("service_category"),
        booking_date: row.get("booking_date"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        time_slot: row.get("time_slot"),
        guests: guests_from_columns(row.get("adults"), row.get("children"), row.get("infants")),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn block_from_sqlite_row(row: &SqliteRow) -> UnavailableDate {
    UnavailableDate {
        id: row.get("id"),
        service_id: row.get("service_id"),
        service_category: row.get("service_category"),
        date: row.get("date"),
        time_slot: row.get("time_slot"),
        reason: row.get("reason"),
        created_at: row.get("created_at"),
    }
}

async fn create_sqlite(pool: &SqlitePool, input: CreateBookingInput) -> Result<Booking> {
    let now = Utc::now();
    let status = BookingStatus::default();
    let result = sqlx::query(
        r#"INSERT INTO bookings (service_id, service_category, booking_date, start_date, end_date, time_slot, adults, children, infants, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(input.service_id)
    .bind(&input.service_category)
    .bind(input.booking_date)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.time_slot)
    .bind(input.guests.map(|g| g.adults))
    .bind(input.guests.map(|g| g.children))
    .bind(input.guests.map(|g| g.infants))
    .bind(status.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Booking {
        id: result.last_insert_rowid(),
        service_id: input.service_id,
        service_category: input.service_category,
        booking_date: input.booking_date,
        start_date: input.start_date,
        end_date: input.end_date,
        time_slot: input.time_slot,
        guests: input.guests,
        status,
        created_at: now,
        updated_at: now,
    })
}

async fn update_status_sqlite(pool: &SqlitePool, id: i64, status: BookingStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn confirmed_in_range_sqlite(
    pool: &SqlitePool,
    service_id: i64,
    service_category: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<Booking>> {
    let rows = sqlx::query(
        r#"SELECT * FROM bookings
           WHERE service_id = ? AND service_category = ? AND status = 'confirmed'
             AND booking_date >= ? AND booking_date <= ?"#,
    )
    .bind(service_id)
    .bind(service_category)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(booking_from_sqlite_row).collect())
}

async fn unavailable_dates_sqlite(
    pool: &SqlitePool,
    service_id: i64,
    service_category: &str,
) -> Result<Vec<UnavailableDate>> {
    let rows = sqlx::query(
        "SELECT * FROM service_unavailable_dates WHERE service_id = ? AND service_category = ?",
    )
    .bind(service_id)
    .bind(service_category)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(block_from_sqlite_row).collect())
}

async fn find_blocks_sqlite(
    pool: &SqlitePool,
    service_id: i64,
    service_category: &str,
    date: NaiveDate,
    time_slot: Option<&str>,
) -> Result<Vec<UnavailableDate>> {
    // A date-level block (NULL slot) covers every slot on that date
    let rows = if let Some(slot) = time_slot {
        sqlx::query(
            r#"SELECT * FROM service_unavailable_dates
               WHERE service_id = ? AND service_category = ? AND date = ?
                 AND (time_slot IS NULL OR time_slot = ?)"#,
        )
        .bind(service_id)
        .bind(service_category)
        .bind(date)
        .bind(slot)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query(
            r#"SELECT * FROM service_unavailable_dates
               WHERE service_id = ? AND service_category = ? AND date = ?"#,
        )
        .bind(service_id)
        .bind(service_category)
        .bind(date)
        .fetch_all(pool)
        .await?
    };

    Ok(rows.iter().map(block_from_sqlite_row).collect())
}

async fn add_unavailable_date_sqlite(
    pool: &SqlitePool,
    input: CreateUnavailableDateInput,
) -> Result<UnavailableDate> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"INSERT INTO service_unavailable_dates (service_id, service_category, date, time_slot, reason, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(input.service_id)
    .bind(&input.service_category)
    .bind(input.date)
    .bind(&input.time_slot)
    .bind(&input.reason)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(UnavailableDate {
        id: result.last_insert_rowid(),
        service_id: input.service_id,
        service_category: input.service_category,
        date: input.date,
        time_slot: input.time_slot,
        reason: input.reason,
        created_at: now,
    })
}

async fn remove_unavailable_date_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM service_unavailable_dates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// MySQL implementations

fn booking_from_mysql_row(row: &MySqlRow) -> Booking {
    Booking {
        id: row.get("id"),
        service_id: row.get("service_id"),
        service_category: row.get("service_category"),
        booking_date: row.get("booking_date"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        time_slot: row.get("time_slot"),
        guests: guests_from_columns(row.get("adults"), row.get("children"), row.get("infants")),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn block_from_mysql_row(row: &MySqlRow) -> UnavailableDate {
    UnavailableDate {
        id: row.get("id"),
        service_id: row.get("service_id"),
        service_category: row.get("service_category"),
        date: row.get("date"),
        time_slot: row.get("time_slot"),
        reason: row.get("reason"),
        created_at: row.get("created_at"),
    }
}

async fn create_mysql(pool: &MySqlPool, input: CreateBookingInput) -> Result<Booking> {
    let now = Utc::now();
    let status = BookingStatus::default();
    let result = sqlx::query(
        r#"INSERT INTO bookings (service_id, service_category, booking_date, start_date, end_date, time_slot, adults, children, infants, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(input.service_id)
    .bind(&input.service_category)
    .bind(input.booking_date)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.time_slot)
    .bind(input.guests.map(|g| g.adults))
    .bind(input.guests.map(|g| g.children))
    .bind(input.guests.map(|g| g.infants))
    .bind(status.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Booking {
        id: result.last_insert_id() as i64,
        service_id: input.service_id,
        service_category: input.service_category,
        booking_date: input.booking_date,
        start_date: input.start_date,
        end_date: input.end_date,
        time_slot: input.time_slot,
        guests: input.guests,
        status,
        created_at: now,
        updated_at: now,
    })
}

async fn update_status_mysql(pool: &MySqlPool, id: i64, status: BookingStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn confirmed_in_range_mysql(
    pool: &MySqlPool,
    service_id: i64,
    service_category: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<Booking>> {
    let rows = sqlx::query(
        r#"SELECT * FROM bookings
           WHERE service_id = ? AND service_category = ? AND status = 'confirmed'
             AND booking_date >= ? AND booking_date <= ?"#,
    )
    .bind(service_id)
    .bind(service_category)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(booking_from_mysql_row).collect())
}

async fn unavailable_dates_mysql(
    pool: &MySqlPool,
    service_id: i64,
    service_category: &str,
) -> Result<Vec<UnavailableDate>> {
    let rows = sqlx::query(
        "SELECT * FROM service_unavailable_dates WHERE service_id = ? AND service_category = ?",
    )
    .bind(service_id)
    .bind(service_category)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(block_from_mysql_row).collect())
}

async fn find_blocks_mysql(
    pool: &MySqlPool,
    service_id: i64,
    service_category: &str,
    date: NaiveDate,
    time_slot: Option<&str>,
) -> Result<Vec<UnavailableDate>> {
    // A date-level block (NULL slot) covers every slot on that date
    let rows = if let Some(slot) = time_slot {
        sqlx::query(
            r#"SELECT * FROM service_unavailable_dates
               WHERE service_id = ? AND service_category = ? AND date = ?
                 AND (time_slot IS NULL OR time_slot = ?)"#,
        )
        .bind(service_id)
        .bind(service_category)
        .bind(date)
        .bind(slot)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query(
            r#"SELECT * FROM service_unavailable_dates
               WHERE service_id = ? AND service_category = ? AND date = ?"#,
        )
        .bind(service_id)
        .bind(service_category)
        .bind(date)
        .fetch_all(pool)
        .await?
    };

    Ok(rows.iter().map(block_from_mysql_row).collect())
}

async fn add_unavailable_date_mysql(
    pool: &MySqlPool,
    input: CreateUnavailableDateInput,
) -> Result<UnavailableDate> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"INSERT INTO service_unavailable_dates (service_id, service_category, date, time_slot, reason, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(input.service_id)
    .bind(&input.service_category)
    .bind(input.date)
    .bind(&input.time_slot)
    .bind(&input.reason)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(UnavailableDate {
        id: result.last_insert_id() as i64,
        service_id: input.service_id,
        service_category: input.service_category,
        date: input.date,
        time_slot: input.time_slot,
        reason: input.reason,
        created_at: now,
    })
}

async fn remove_unavailable_date_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM service_unavailable_dates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
