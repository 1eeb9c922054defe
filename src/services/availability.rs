//! Availability service
//!
//! Answers "can resource X be booked on date D (optionally at slot T)?"
//! and lists blocked dates for calendar rendering. Pure reads; the
//! service performs no mutation and holds no state of its own.
//!
//! Failure policy is asymmetric on purpose:
//! - List queries fail open to empty collections so a calendar renders
//!   an empty state instead of crashing.
//! - The block-list check skips itself on error (an infrastructure
//!   hiccup never reports a date as blocked).
//! - The booking-exclusivity check returns available on error (an
//!   infrastructure hiccup never falsely denies a booking attempt).

use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::repositories::BookingRepository;
use crate::models::{Booking, UnavailableDate};

/// Availability service
pub struct AvailabilityService {
    repo: Arc<dyn BookingRepository>,
}

impl AvailabilityService {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    /// All explicit block records for a resource, unordered
    ///
    /// Callers cannot distinguish "no blocks" from "query failed"; both
    /// come back as an empty list.
    pub async fn get_unavailable_dates(
        &self,
        service_id: i64,
        service_category: &str,
    ) -> Vec<UnavailableDate> {
        match self.repo.unavailable_dates(service_id, service_category).await {
            Ok(dates) => dates,
            Err(e) => {
                tracing::warn!(
                    service_id,
                    service_category,
                    error = %e,
                    "Unavailable-dates query failed, returning empty list"
                );
                Vec::new()
            }
        }
    }

    /// Confirmed bookings whose booking date falls within [start, end]
    ///
    /// Used to paint a calendar with occupied days. Same fail-open policy
    /// as `get_unavailable_dates`.
    pub async fn get_bookings_for_date_range(
        &self,
        service_id: i64,
        service_category: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<Booking> {
        match self
            .repo
            .confirmed_in_range(service_id, service_category, start_date, end_date)
            .await
        {
            Ok(bookings) => bookings,
            Err(e) => {
                tracing::warn!(
                    service_id,
                    service_category,
                    error = %e,
                    "Booking-range query failed, returning empty list"
                );
                Vec::new()
            }
        }
    }

    /// Core conflict check
    ///
    /// An explicit block always wins over booking state. With a time slot,
    /// the date is available iff no confirmed booking occupies that exact
    /// slot. Without a time slot, confirmed bookings do not block the
    /// date: day-level capacity is not enforced at this layer (pending an
    /// upstream capacity policy decision; do not change silently).
    pub async fn is_date_available(
        &self,
        service_id: i64,
        service_category: &str,
        date: NaiveDate,
        time_slot: Option<&str>,
    ) -> bool {
        // Step 1: explicit blocks take precedence. On error the check is
        // skipped, never treated as blocked.
        match self
            .repo
            .find_blocks(service_id, service_category, date, time_slot)
            .await
        {
            Ok(blocks) if !blocks.is_empty() => return false,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    service_id,
                    service_category,
                    %date,
                    error = %e,
                    "Block-list query failed, skipping block check"
                );
            }
        }

        // Step 2: slot-level exclusivity against confirmed bookings.
        let Some(slot) = time_slot else {
            // Whole-day bookings carry no capacity limit here.
            return true;
        };

        match self
            .repo
            .confirmed_on_date(service_id, service_category, date)
            .await
        {
            Ok(bookings) => bookings
                .iter()
                .all(|booking| booking.time_slot.as_deref() != Some(slot)),
            Err(e) => {
                // Fail open: never deny availability on an infrastructure error.
                tracing::warn!(
                    service_id,
                    service_category,
                    %date,
                    error = %e,
                    "Booking query failed, treating slot as available"
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::BookingRepositoryImpl;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{
        BookingStatus, CreateBookingInput, CreateUnavailableDateInput,
    };
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn setup() -> (AvailabilityService, Arc<BookingRepositoryImpl>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = Arc::new(BookingRepositoryImpl::new(pool));
        (AvailabilityService::new(repo.clone()), repo)
    }

    async fn confirmed_booking(
        repo: &BookingRepositoryImpl,
        service_id: i64,
        category: &str,
        day: &str,
        slot: Option<&str>,
    ) {
        let booking = repo
            .create(CreateBookingInput {
                service_id,
                service_category: category.to_string(),
                booking_date: date(day),
                start_date: None,
                end_date: None,
                time_slot: slot.map(|s| s.to_string()),
                guests: None,
            })
            .await
            .expect("Failed to create booking");
        repo.update_status(booking.id, BookingStatus::Confirmed)
            .await
            .expect("Failed to confirm booking");
    }

    #[tokio::test]
    async fn test_block_precedence_over_bookings() {
        let (service, repo) = setup().await;

        repo.add_unavailable_date(CreateUnavailableDateInput {
            service_id: 1,
            service_category: "hotel".to_string(),
            date: date("2026-09-10"),
            time_slot: None,
            reason: Some("renovation".to_string()),
        })
        .await
        .expect("Failed to add block");

        // Blocked even though zero bookings exist for that date
        assert!(
            !service
                .is_date_available(1, "hotel", date("2026-09-10"), None)
                .await
        );
        assert!(
            !service
                .is_date_available(1, "hotel", date("2026-09-10"), Some("10:00 AM"))
                .await
        );
    }

    #[tokio::test]
    async fn test_slot_level_block() {
        let (service, repo) = setup().await;

        repo.add_unavailable_date(CreateUnavailableDateInput {
            service_id: 1,
            service_category: "class".to_string(),
            date: date("2026-09-10"),
            time_slot: Some("10:00 AM".to_string()),
            reason: None,
        })
        .await
        .expect("Failed to add block");

        assert!(
            !service
                .is_date_available(1, "class", date("2026-09-10"), Some("10:00 AM"))
                .await
        );
        // A different slot is not covered by the slot-scoped block
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-10"), Some("2:00 PM"))
                .await
        );
    }

    #[tokio::test]
    async fn test_slot_exclusivity() {
        let (service, repo) = setup().await;

        confirmed_booking(&repo, 1, "class", "2026-09-11", Some("10:00 AM")).await;

        assert!(
            !service
                .is_date_available(1, "class", date("2026-09-11"), Some("10:00 AM"))
                .await
        );
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-11"), Some("2:00 PM"))
                .await
        );
        // Other dates and resources are unaffected
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-12"), Some("10:00 AM"))
                .await
        );
        assert!(
            service
                .is_date_available(2, "class", date("2026-09-11"), Some("10:00 AM"))
                .await
        );
    }

    #[tokio::test]
    async fn test_whole_day_capacity_not_enforced() {
        let (service, repo) = setup().await;

        for _ in 0..3 {
            confirmed_booking(&repo, 1, "hotel", "2026-09-13", None).await;
        }

        // Day-level bookings never make the date unavailable
        assert!(
            service
                .is_date_available(1, "hotel", date("2026-09-13"), None)
                .await
        );
    }

    #[tokio::test]
    async fn test_pending_and_cancelled_do_not_block() {
        let (service, repo) = setup().await;

        let booking = repo
            .create(CreateBookingInput {
                service_id: 1,
                service_category: "class".to_string(),
                booking_date: date("2026-09-14"),
                start_date: None,
                end_date: None,
                time_slot: Some("10:00 AM".to_string()),
                guests: None,
            })
            .await
            .expect("Failed to create booking");

        // Pending
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-14"), Some("10:00 AM"))
                .await
        );

        repo.update_status(booking.id, BookingStatus::Cancelled)
            .await
            .expect("Failed to cancel");
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-14"), Some("10:00 AM"))
                .await
        );
    }

    #[tokio::test]
    async fn test_get_bookings_for_date_range() {
        let (service, repo) = setup().await;

        confirmed_booking(&repo, 1, "hotel", "2026-09-01", None).await;
        confirmed_booking(&repo, 1, "hotel", "2026-09-05", None).await;
        confirmed_booking(&repo, 1, "hotel", "2026-09-20", None).await;

        let bookings = service
            .get_bookings_for_date_range(1, "hotel", date("2026-09-01"), date("2026-09-10"))
            .await;
        assert_eq!(bookings.len(), 2);
    }

    #[tokio::test]
    async fn test_get_unavailable_dates() {
        let (service, repo) = setup().await;

        repo.add_unavailable_date(CreateUnavailableDateInput {
            service_id: 3,
            service_category: "hotel".to_string(),
            date: date("2026-09-15"),
            time_slot: None,
            reason: None,
        })
        .await
        .expect("Failed to add block");

        let blocks = service.get_unavailable_dates(3, "hotel").await;
        assert_eq!(blocks.len(), 1);
        assert!(service.get_unavailable_dates(4, "hotel").await.is_empty());
    }

    /// Repository whose every query fails, for exercising the fail-open paths
    struct FailingRepo;

    #[async_trait]
    impl BookingRepository for FailingRepo {
        async fn create(&self, _input: CreateBookingInput) -> Result<Booking> {
            Err(anyhow!("connection refused"))
        }

        async fn update_status(&self, _id: i64, _status: BookingStatus) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }

        async fn confirmed_on_date(
            &self,
            _service_id: i64,
            _service_category: &str,
            _date: NaiveDate,
        ) -> Result<Vec<Booking>> {
            Err(anyhow!("connection refused"))
        }

        async fn confirmed_in_range(
            &self,
            _service_id: i64,
            _service_category: &str,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<Booking>> {
            Err(anyhow!("connection refused"))
        }

        async fn unavailable_dates(
            &self,
            _service_id: i64,
            _service_category: &str,
        ) -> Result<Vec<UnavailableDate>> {
            Err(anyhow!("connection refused"))
        }

        async fn find_blocks(
            &self,
            _service_id: i64,
            _service_category: &str,
            _date: NaiveDate,
            _time_slot: Option<&str>,
        ) -> Result<Vec<UnavailableDate>> {
            Err(anyhow!("connection refused"))
        }

        async fn add_unavailable_date(
            &self,
            _input: CreateUnavailableDateInput,
        ) -> Result<UnavailableDate> {
            Err(anyhow!("connection refused"))
        }

        async fn remove_unavailable_date(&self, _id: i64) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_fail_open_on_availability_check() {
        let service = AvailabilityService::new(Arc::new(FailingRepo));

        // Errors never falsely deny availability
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-10"), Some("10:00 AM"))
                .await
        );
        assert!(
            service
                .is_date_available(1, "class", date("2026-09-10"), None)
                .await
        );
    }

    #[tokio::test]
    async fn test_fail_open_on_list_queries() {
        let service = AvailabilityService::new(Arc::new(FailingRepo));

        assert!(service.get_unavailable_dates(1, "class").await.is_empty());
        assert!(
            service
                .get_bookings_for_date_range(1, "class", date("2026-09-01"), date("2026-09-30"))
                .await
                .is_empty()
        );
    }
}
