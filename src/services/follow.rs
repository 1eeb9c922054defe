//! Follow-graph service
//!
//! Mutates and queries the directed follow graph, and derives the three
//! user-facing lists (followers, following, suggestions) for a profile.
//!
//! Caller identity is passed explicitly to every operation instead of
//! being read from ambient auth state; `None` means unauthenticated.
//! Mutations report error detail, read operations fail silently to
//! empty/false defaults — the UI renders an empty state rather than a
//! crash, and a failed follow shows a generic toast.

use std::sync::Arc;

use crate::config::FollowConfig;
use crate::db::repositories::FollowRepository;
use crate::models::{FollowStats, FollowerEntry, FollowingEntry, Profile};

/// Error types for follow-graph mutations
#[derive(Debug, thiserror::Error)]
pub enum FollowServiceError {
    /// Operation requires a signed-in caller and none is present
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Target of a follow equals the caller
    #[error("Cannot follow yourself")]
    SelfFollow,

    /// Failure from the underlying store
    #[error("{0}")]
    Store(String),
}

/// Follow-graph service
pub struct FollowGraphService {
    repo: Arc<dyn FollowRepository>,
    suggestion_page_size: i64,
}

impl FollowGraphService {
    pub fn new(repo: Arc<dyn FollowRepository>) -> Self {
        Self {
            repo,
            suggestion_page_size: FollowConfig::default().suggestion_page_size,
        }
    }

    pub fn with_config(repo: Arc<dyn FollowRepository>, config: &FollowConfig) -> Self {
        Self {
            repo,
            suggestion_page_size: config.suggestion_page_size,
        }
    }

    /// Follow a user
    ///
    /// The self-follow check runs before any persistence write. There is
    /// no existence pre-check: a duplicate edge is swallowed by the
    /// store's unique index and reported as success, so concurrent
    /// duplicate follows stay exactly-once without application locking.
    pub async fn follow_user(
        &self,
        caller: Option<i64>,
        following_id: i64,
    ) -> Result<(), FollowServiceError> {
        let caller = caller.ok_or(FollowServiceError::NotAuthenticated)?;
        if caller == following_id {
            return Err(FollowServiceError::SelfFollow);
        }

        match self.repo.insert_edge(caller, following_id).await {
            Ok(_newly_inserted) => Ok(()),
            Err(e) => Err(FollowServiceError::Store(e.to_string())),
        }
    }

    /// Unfollow a user
    ///
    /// Unconditionally idempotent: deleting a non-existent edge still
    /// reports success.
    pub async fn unfollow_user(
        &self,
        caller: Option<i64>,
        following_id: i64,
    ) -> Result<(), FollowServiceError> {
        let caller = caller.ok_or(FollowServiceError::NotAuthenticated)?;

        match self.repo.delete_edge(caller, following_id).await {
            Ok(_deleted) => Ok(()),
            Err(e) => Err(FollowServiceError::Store(e.to_string())),
        }
    }

    /// Whether the caller follows `following_id`
    ///
    /// Unauthenticated callers and persistence errors both yield false.
    pub async fn check_is_following(&self, caller: Option<i64>, following_id: i64) -> bool {
        let Some(caller) = caller else {
            return false;
        };

        match self.repo.edge_exists(caller, following_id).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(caller, following_id, error = %e, "Follow check failed");
                false
            }
        }
    }

    /// Aggregate follow statistics for `user_id`
    ///
    /// The counts are about `user_id`; `is_following` is about the
    /// caller. The three sub-queries run concurrently and each falls
    /// back to its zero/false default on failure without aborting the
    /// others.
    pub async fn get_follow_stats(&self, caller: Option<i64>, user_id: i64) -> FollowStats {
        let is_following = async {
            match caller {
                Some(caller_id) => self.repo.edge_exists(caller_id, user_id).await,
                None => Ok(false),
            }
        };

        let (followers, following, is_following) = tokio::join!(
            self.repo.follower_count(user_id),
            self.repo.following_count(user_id),
            is_following,
        );

        FollowStats {
            followers_count: followers.unwrap_or_else(|e| {
                tracing::warn!(user_id, error = %e, "Follower count failed");
                0
            }),
            following_count: following.unwrap_or_else(|e| {
                tracing::warn!(user_id, error = %e, "Following count failed");
                0
            }),
            is_following: is_following.unwrap_or_else(|e| {
                tracing::warn!(user_id, error = %e, "Follow check failed");
                false
            }),
        }
    }

    /// Followers of `user_id` with profiles, most recent edge first
    pub async fn get_followers(&self, user_id: i64) -> Vec<FollowerEntry> {
        match self.repo.followers(user_id).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Followers query failed");
                Vec::new()
            }
        }
    }

    /// Users `user_id` follows with profiles, most recent edge first
    pub async fn get_following(&self, user_id: i64) -> Vec<FollowingEntry> {
        match self.repo.following(user_id).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Following query failed");
                Vec::new()
            }
        }
    }

    /// Profiles the caller neither is nor already follows
    ///
    /// Capped at the configured page size; no ranking guarantee.
    /// Unauthenticated callers get an empty list.
    pub async fn get_suggestions(&self, caller: Option<i64>) -> Vec<Profile> {
        let Some(caller) = caller else {
            return Vec::new();
        };

        match self.repo.suggestions(caller, self.suggestion_page_size).await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!(caller, error = %e, "Suggestions query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        FollowRepositoryImpl, ProfileRepository, ProfileRepositoryImpl,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateProfileInput;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    async fn setup() -> (FollowGraphService, Vec<i64>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let profiles = ProfileRepositoryImpl::new(pool.clone());
        let mut ids = Vec::new();
        for username in ["alice", "bob", "carol", "dave"] {
            let profile = profiles
                .create(CreateProfileInput {
                    username: username.to_string(),
                    full_name: None,
                    avatar_url: None,
                })
                .await
                .expect("Failed to create profile");
            ids.push(profile.id);
        }

        let repo = Arc::new(FollowRepositoryImpl::new(pool));
        (FollowGraphService::new(repo), ids)
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let (service, ids) = setup().await;
        let alice = ids[0];

        let err = service
            .follow_user(Some(alice), alice)
            .await
            .expect_err("Self-follow must fail");
        assert_eq!(err.to_string(), "Cannot follow yourself");

        // No edge was created
        let stats = service.get_follow_stats(None, alice).await;
        assert_eq!(stats.followers_count, 0);
        assert_eq!(stats.following_count, 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_mutations_rejected() {
        let (service, ids) = setup().await;
        let bob = ids[1];

        assert!(matches!(
            service.follow_user(None, bob).await,
            Err(FollowServiceError::NotAuthenticated)
        ));
        assert!(matches!(
            service.unfollow_user(None, bob).await,
            Err(FollowServiceError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_unauthenticated_reads_fail_silently() {
        let (service, ids) = setup().await;
        let bob = ids[1];

        assert!(!service.check_is_following(None, bob).await);
        assert!(service.get_suggestions(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_follow_unfollow_round_trip() {
        let (service, ids) = setup().await;
        let (alice, bob) = (ids[0], ids[1]);

        service
            .follow_user(Some(alice), bob)
            .await
            .expect("Follow should succeed");
        assert!(service.check_is_following(Some(alice), bob).await);

        service
            .unfollow_user(Some(alice), bob)
            .await
            .expect("Unfollow should succeed");
        assert!(!service.check_is_following(Some(alice), bob).await);
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_benign() {
        let (service, ids) = setup().await;
        let (alice, bob) = (ids[0], ids[1]);

        service
            .follow_user(Some(alice), bob)
            .await
            .expect("Follow should succeed");
        service
            .follow_user(Some(alice), bob)
            .await
            .expect("Duplicate follow should be a no-op");

        let stats = service.get_follow_stats(Some(alice), bob).await;
        assert_eq!(stats.followers_count, 1);
    }

    #[tokio::test]
    async fn test_idempotent_unfollow() {
        let (service, ids) = setup().await;
        let (alice, bob) = (ids[0], ids[1]);

        // No edge exists; unfollow still succeeds and changes nothing
        service
            .unfollow_user(Some(alice), bob)
            .await
            .expect("Unfollow of missing edge should succeed");

        let stats = service.get_follow_stats(None, bob).await;
        assert_eq!(stats.followers_count, 0);
    }

    #[tokio::test]
    async fn test_stats_consistency() {
        let (service, ids) = setup().await;
        let (alice, bob) = (ids[0], ids[1]);

        let before = service.get_follow_stats(Some(alice), bob).await;

        service
            .follow_user(Some(alice), bob)
            .await
            .expect("Follow should succeed");

        let after = service.get_follow_stats(Some(alice), bob).await;
        assert_eq!(after.followers_count, before.followers_count + 1);
        assert!(after.is_following);

        // is_following is caller-relative, not subject-relative
        let (carol, _) = (ids[2], ids[3]);
        let other_view = service.get_follow_stats(Some(carol), bob).await;
        assert_eq!(other_view.followers_count, after.followers_count);
        assert!(!other_view.is_following);
    }

    #[tokio::test]
    async fn test_followers_and_following_lists() {
        let (service, ids) = setup().await;
        let (alice, bob, carol) = (ids[0], ids[1], ids[2]);

        service.follow_user(Some(alice), bob).await.unwrap();
        service.follow_user(Some(carol), bob).await.unwrap();
        service.follow_user(Some(alice), carol).await.unwrap();

        let bob_followers = service.get_followers(bob).await;
        assert_eq!(bob_followers.len(), 2);

        let alice_following = service.get_following(alice).await;
        assert_eq!(alice_following.len(), 2);
        assert!(alice_following
            .iter()
            .all(|entry| entry.profile.id == entry.following_id));
    }

    #[tokio::test]
    async fn test_suggestions_exclude_self_and_followees() {
        let (service, ids) = setup().await;
        let (alice, bob) = (ids[0], ids[1]);

        service.follow_user(Some(alice), bob).await.unwrap();

        let suggestions = service.get_suggestions(Some(alice)).await;
        assert!(!suggestions.is_empty());
        assert!(suggestions.iter().all(|p| p.id != alice && p.id != bob));
    }

    #[tokio::test]
    async fn test_suggestions_page_size() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let profiles = ProfileRepositoryImpl::new(pool.clone());
        let mut first = None;
        for i in 0..5 {
            let profile = profiles
                .create(CreateProfileInput {
                    username: format!("user{}", i),
                    full_name: None,
                    avatar_url: None,
                })
                .await
                .expect("Failed to create profile");
            first.get_or_insert(profile.id);
        }

        let repo = Arc::new(FollowRepositoryImpl::new(pool));
        let service = FollowGraphService::with_config(
            repo,
            &FollowConfig {
                suggestion_page_size: 2,
            },
        );

        let suggestions = service.get_suggestions(first).await;
        assert_eq!(suggestions.len(), 2);
    }

    /// Repository whose every query fails, for exercising the fail-open paths
    struct FailingRepo;

    #[async_trait]
    impl FollowRepository for FailingRepo {
        async fn insert_edge(&self, _follower_id: i64, _following_id: i64) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }

        async fn delete_edge(&self, _follower_id: i64, _following_id: i64) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }

        async fn edge_exists(&self, _follower_id: i64, _following_id: i64) -> Result<bool> {
            Err(anyhow!("connection refused"))
        }

        async fn follower_count(&self, _user_id: i64) -> Result<i64> {
            Err(anyhow!("connection refused"))
        }

        async fn following_count(&self, _user_id: i64) -> Result<i64> {
            Err(anyhow!("connection refused"))
        }

        async fn followers(&self, _user_id: i64) -> Result<Vec<FollowerEntry>> {
            Err(anyhow!("connection refused"))
        }

        async fn following(&self, _user_id: i64) -> Result<Vec<FollowingEntry>> {
            Err(anyhow!("connection refused"))
        }

        async fn suggestions(&self, _user_id: i64, _limit: i64) -> Result<Vec<Profile>> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_store_error_surfaces_on_mutations() {
        let service = FollowGraphService::new(Arc::new(FailingRepo));

        let err = service
            .follow_user(Some(1), 2)
            .await
            .expect_err("Store failure must surface");
        assert!(matches!(err, FollowServiceError::Store(_)));
        assert!(matches!(
            service.unfollow_user(Some(1), 2).await,
            Err(FollowServiceError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_fail_open_on_store_error() {
        let service = FollowGraphService::new(Arc::new(FailingRepo));

        assert!(!service.check_is_following(Some(1), 2).await);
        assert!(service.get_followers(2).await.is_empty());
        assert!(service.get_following(2).await.is_empty());
        assert!(service.get_suggestions(Some(1)).await.is_empty());

        let stats = service.get_follow_stats(Some(1), 2).await;
        assert_eq!(stats.followers_count, 0);
        assert_eq!(stats.following_count, 0);
        assert!(!stats.is_following);
    }
}
