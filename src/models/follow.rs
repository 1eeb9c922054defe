//! Follow-graph models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Profile;

/// Aggregate follow statistics for a profile
///
/// `followers_count` and `following_count` are subject-relative;
/// `is_following` is relative to the calling user. UI logic depends on
/// this asymmetry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowStats {
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
}

/// A follower edge decorated with the follower's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerEntry {
    pub follower_id: i64,
    pub created_at: DateTime<Utc>,
    pub profile: Profile,
}

/// A following edge decorated with the followed profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowingEntry {
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
    pub profile: Profile,
}
