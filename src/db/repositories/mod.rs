//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the query surface for one entity family.

pub mod booking;
pub mod follow;
pub mod profile;

pub use booking::{BookingRepository, BookingRepositoryImpl};
pub use follow::{FollowRepository, FollowRepositoryImpl};
pub use profile::{ProfileRepository, ProfileRepositoryImpl};
