//! Services layer - Business logic
//!
//! This module contains the business-logic services for the Plaza core.
//! Services are responsible for:
//! - Implementing business rules (conflict policy, follow-graph invariants)
//! - Coordinating repositories
//! - Converting persistence failures into safe defaults at the boundary

pub mod availability;
pub mod follow;

pub use availability::AvailabilityService;
pub use follow::{FollowGraphService, FollowServiceError};
