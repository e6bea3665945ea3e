//! Account service
//!
//! Registration, login, profiles, and the follow/unfollow toggle.

use std::sync::Arc;

use crate::auth::{password, token};
use crate::data::{
    AccessToken, Database, EntityId, Follow, NotificationVerb, TargetType, User,
    is_unique_violation,
};
use crate::error::AppError;
use crate::metrics::USERS_TOTAL;
use crate::service::NotificationService;

/// Result of a follow toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    Followed,
    Unfollowed,
}

impl FollowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followed => "followed",
            Self::Unfollowed => "unfollowed",
        }
    }
}

/// A user together with their follow-graph counts
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
    token_secret: String,
    notifications: NotificationService,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>, token_secret: String) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self {
            db,
            token_secret,
            notifications,
        }
    }

    /// Register a new user
    ///
    /// # Arguments
    /// * `username` - Unique username (trimmed, non-empty)
    /// * `email` - Contact email (may be empty)
    /// * `password` - Plaintext password, hashed before storage
    /// * `bio` - Optional profile text
    ///
    /// # Returns
    /// The created user and a fresh bearer token
    ///
    /// # Errors
    /// Validation error on empty username/password or duplicate username
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        bio: &str,
    ) -> Result<(User, String), AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username cannot be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }

        let password_hash = password::hash_password(password)?;

        let now = chrono::Utc::now();
        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            email: email.trim().to_string(),
            password_hash,
            bio: bio.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        if let Err(error) = self.db.insert_user(&user).await {
            if let AppError::Database(sqlx_error) = &error {
                if is_unique_violation(sqlx_error) {
                    return Err(AppError::Validation(
                        "username is already taken".to_string(),
                    ));
                }
            }
            return Err(error);
        }

        USERS_TOTAL.inc();
        tracing::info!(username = %user.username, "User registered");

        let raw_token = self.issue_token(&user.id).await?;
        Ok((user, raw_token))
    }

    /// Log in with username and password
    ///
    /// # Returns
    /// The user and a fresh bearer token
    ///
    /// # Errors
    /// Validation error on unknown username or wrong password. The two
    /// cases are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AppError> {
        let invalid = || AppError::Validation("invalid credentials".to_string());

        let user = self
            .db
            .get_user_by_username(username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !password::verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        let raw_token = self.issue_token(&user.id).await?;
        Ok((user, raw_token))
    }

    /// Issue a fresh bearer token for a user
    ///
    /// Only the keyed hash is stored; the raw token is returned once.
    async fn issue_token(&self, user_id: &str) -> Result<String, AppError> {
        let raw_token = token::generate_token();
        let token_hash = token::hash_token(&raw_token, &self.token_secret)?;

        let record = AccessToken {
            id: EntityId::new().0,
            user_id: user_id.to_string(),
            token_hash,
            created_at: chrono::Utc::now(),
        };
        self.db.insert_access_token(&record).await?;

        Ok(raw_token)
    }

    /// Get a user's profile with follower/following counts
    pub async fn profile(&self, user_id: &str) -> Result<Profile, AppError> {
        let user = self.db.get_user(user_id).await?.ok_or(AppError::NotFound)?;
        self.profile_of(user).await
    }

    /// Attach follow-graph counts to an already-loaded user
    pub async fn profile_of(&self, user: User) -> Result<Profile, AppError> {
        let followers_count = self.db.count_followers(&user.id).await?;
        let following_count = self.db.count_following(&user.id).await?;

        Ok(Profile {
            user,
            followers_count,
            following_count,
        })
    }

    /// Update the caller's own profile
    ///
    /// # Arguments
    /// * `email` - New email, or None to leave unchanged
    /// * `bio` - New bio, or None to leave unchanged
    pub async fn update_profile(
        &self,
        user_id: &str,
        email: Option<String>,
        bio: Option<String>,
    ) -> Result<Profile, AppError> {
        if email.is_none() && bio.is_none() {
            return self.profile(user_id).await;
        }

        let updated = self
            .db
            .patch_user_profile(
                user_id,
                email.as_deref().map(str::trim),
                bio.as_deref().map(str::trim),
                chrono::Utc::now(),
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound);
        }

        self.profile(user_id).await
    }

    /// Toggle the follow relation from `actor` to the target user
    ///
    /// Idempotent: if the edge exists it is removed, otherwise added.
    /// Set semantics are enforced by the unique index on the edge, so
    /// repeated calls never accumulate duplicates.
    ///
    /// # Errors
    /// * NotFound - target user does not exist
    /// * Validation - actor targets themselves
    pub async fn toggle_follow(
        &self,
        actor: &User,
        target_user_id: &str,
    ) -> Result<FollowAction, AppError> {
        let target = self
            .db
            .get_user(target_user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if actor.id == target.id {
            return Err(AppError::Validation(
                "you cannot follow yourself".to_string(),
            ));
        }

        if self.db.delete_follow(&actor.id, &target.id).await? {
            tracing::debug!(actor = %actor.username, target = %target.username, "Unfollowed");
            return Ok(FollowAction::Unfollowed);
        }

        let follow = Follow {
            id: EntityId::new().0,
            follower_id: actor.id.clone(),
            followed_id: target.id.clone(),
            created_at: chrono::Utc::now(),
        };
        let inserted = self.db.insert_follow(&follow).await?;

        if inserted {
            self.notifications
                .emit(
                    &actor.id,
                    &target.id,
                    NotificationVerb::Followed,
                    TargetType::User,
                    &actor.id,
                )
                .await?;
        }

        tracing::debug!(actor = %actor.username, target = %target.username, "Followed");
        Ok(FollowAction::Followed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SECRET: &str = "test-secret-key-32-bytes-long!!!";

    async fn create_service() -> (AccountService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-account.db");
        let db = Arc::new(Database::connect(&db_path).await.unwrap());
        let service = AccountService::new(db.clone(), SECRET.to_string());
        (service, db, temp_dir)
    }

    #[tokio::test]
    async fn register_creates_user_and_token() {
        let (service, db, _temp_dir) = create_service().await;

        let (user, raw_token) = service
            .register(" alice ", "alice@example.com", "hunter2", "hi")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.bio, "hi");
        assert_ne!(user.password_hash, "hunter2");

        // The issued token resolves back to the user
        let token_hash = token::hash_token(&raw_token, SECRET).unwrap();
        let resolved = db.get_user_by_token_hash(&token_hash).await.unwrap();
        assert_eq!(resolved.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let (service, _db, _temp_dir) = create_service().await;

        service
            .register("alice", "", "hunter2", "")
            .await
            .unwrap();

        let error = service
            .register("alice", "", "other-password", "")
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            AppError::Validation(message) if message.contains("already taken")
        ));
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let (service, _db, _temp_dir) = create_service().await;

        let empty_name = service.register("  ", "", "pw", "").await.unwrap_err();
        assert!(matches!(empty_name, AppError::Validation(_)));

        let empty_password = service.register("alice", "", "", "").await.unwrap_err();
        assert!(matches!(empty_password, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn login_verifies_credentials() {
        let (service, _db, _temp_dir) = create_service().await;

        service
            .register("alice", "", "hunter2", "")
            .await
            .unwrap();

        let (user, _token) = service.login("alice", "hunter2").await.unwrap();
        assert_eq!(user.username, "alice");

        let wrong_password = service.login("alice", "nope").await.unwrap_err();
        assert!(matches!(wrong_password, AppError::Validation(_)));

        let unknown_user = service.login("bob", "hunter2").await.unwrap_err();
        assert!(matches!(unknown_user, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn toggle_follow_alternates_and_notifies_once() {
        let (service, db, _temp_dir) = create_service().await;

        let (alice, _) = service.register("alice", "", "pw", "").await.unwrap();
        let (bob, _) = service.register("bob", "", "pw", "").await.unwrap();

        let first = service.toggle_follow(&alice, &bob.id).await.unwrap();
        assert_eq!(first, FollowAction::Followed);
        assert!(db.follow_exists(&alice.id, &bob.id).await.unwrap());

        // Bob got a notification, Alice did not
        assert_eq!(db.count_notifications(&bob.id).await.unwrap(), 1);
        assert_eq!(db.count_notifications(&alice.id).await.unwrap(), 0);

        let second = service.toggle_follow(&alice, &bob.id).await.unwrap();
        assert_eq!(second, FollowAction::Unfollowed);
        assert!(!db.follow_exists(&alice.id, &bob.id).await.unwrap());

        // Unfollow does not notify
        assert_eq!(db.count_notifications(&bob.id).await.unwrap(), 1);

        // Asymmetric: alice following bob said nothing about the reverse
        assert!(!db.follow_exists(&bob.id, &alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn toggle_follow_rejects_self_and_missing_target() {
        let (service, _db, _temp_dir) = create_service().await;

        let (alice, _) = service.register("alice", "", "pw", "").await.unwrap();

        let self_follow = service.toggle_follow(&alice, &alice.id).await.unwrap_err();
        assert!(matches!(self_follow, AppError::Validation(_)));

        let missing = service.toggle_follow(&alice, "missing-id").await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound));
    }

    #[tokio::test]
    async fn profile_reports_follow_counts() {
        let (service, _db, _temp_dir) = create_service().await;

        let (alice, _) = service.register("alice", "", "pw", "").await.unwrap();
        let (bob, _) = service.register("bob", "", "pw", "").await.unwrap();
        let (carol, _) = service.register("carol", "", "pw", "").await.unwrap();

        service.toggle_follow(&bob, &alice.id).await.unwrap();
        service.toggle_follow(&carol, &alice.id).await.unwrap();
        service.toggle_follow(&alice, &bob.id).await.unwrap();

        let profile = service.profile(&alice.id).await.unwrap();
        assert_eq!(profile.followers_count, 2);
        assert_eq!(profile.following_count, 1);
    }

    #[tokio::test]
    async fn update_profile_patches_fields() {
        let (service, _db, _temp_dir) = create_service().await;

        let (alice, _) = service
            .register("alice", "old@example.com", "pw", "old bio")
            .await
            .unwrap();

        let updated = service
            .update_profile(&alice.id, None, Some("new bio".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.user.bio, "new bio");
        assert_eq!(updated.user.email, "old@example.com");

        let unchanged = service.update_profile(&alice.id, None, None).await.unwrap();
        assert_eq!(unchanged.user.bio, "new bio");
    }
}
