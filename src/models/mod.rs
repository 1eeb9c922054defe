//! Data models
//!
//! Typed records for the Plaza core services. Rows coming back from the
//! persistence layer are converted into these structs once at the
//! repository boundary.

pub mod booking;
pub mod follow;
pub mod profile;

pub use booking::{
    Booking, BookingStatus, CreateBookingInput, CreateUnavailableDateInput, Guests,
    UnavailableDate,
};
pub use follow::{FollowStats, FollowerEntry, FollowingEntry};
pub use profile::{CreateProfileInput, Profile};
