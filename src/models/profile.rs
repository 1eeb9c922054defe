//! Profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile entity
///
/// Read-only from the follow graph's perspective; used to decorate
/// follower/following query results into displayable user records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a profile
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfileInput {
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}
