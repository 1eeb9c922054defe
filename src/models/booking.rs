//! Booking and unavailable-date models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Booking status
///
/// Only `Confirmed` bookings block availability. Status transitions are
/// driven by external actors (checkout, provider actions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// Guest counts attached to a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guests {
    pub adults: i64,
    pub children: i64,
    pub infants: i64,
}

/// Booking entity
///
/// A booking targets a resource identified by (service_id, service_category)
/// on a calendar date, optionally at a specific time slot. Multi-day stays
/// carry start_date/end_date in addition to the booking date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub service_id: i64,
    pub service_category: String,
    pub booking_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub guests: Option<Guests>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a booking
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingInput {
    pub service_id: i64,
    pub service_category: String,
    pub booking_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub guests: Option<Guests>,
}

/// Explicit availability block, independent of booking state
///
/// A matching row makes the date (or slot) unavailable regardless of how
/// many bookings exist, e.g. a provider-declared closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableDate {
    pub id: i64,
    pub service_id: i64,
    pub service_category: String,
    pub date: NaiveDate,
    pub time_slot: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an unavailable-date block
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUnavailableDateInput {
    pub service_id: i64,
    pub service_category: String,
    pub date: NaiveDate,
    pub time_slot: Option<String>,
    pub reason: Option<String>,
}
