//! API request and response types
//!
//! Wire-level shapes for the JSON API. Response types are built from
//! the service layer's models plus whatever enrichment (usernames,
//! counts) the endpoint carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Comment, Notification, Post, User};
use crate::service::Profile;

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// Public view of a user, without the follow-graph counts
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.user.id,
            username: profile.user.username,
            email: profile.user.email,
            bio: profile.user.bio,
            followers_count: profile.followers_count,
            following_count: profile.following_count,
            created_at: profile.user.created_at,
        }
    }
}

/// Outcome of a follow toggle, `action` is "followed" or "unfollowed"
#[derive(Debug, Serialize)]
pub struct FollowToggleResponse {
    pub action: &'static str,
    pub user_id: String,
}

// =============================================================================
// Posts and comments
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub author: String,
    pub author_username: String,
    pub title: String,
    pub content: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, author_username: String, likes_count: i64, comments_count: i64) -> Self {
        Self {
            id: post.id,
            author: post.author_id,
            author_username,
            title: post.title,
            content: post.content,
            likes_count,
            comments_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Outcome of a like toggle, `action` is "liked" or "unliked"
#[derive(Debug, Serialize)]
pub struct LikeToggleResponse {
    pub action: &'static str,
    pub post_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub post: String,
    pub author: String,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: Comment, author_username: String) -> Self {
        Self {
            id: comment.id,
            post: comment.post_id,
            author: comment.author_id,
            author_username,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub actor: String,
    pub actor_username: String,
    pub verb: String,
    pub target_type: String,
    pub target_id: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationResponse {
    pub fn new(notification: Notification, actor_username: String) -> Self {
        Self {
            id: notification.id,
            actor: notification.actor_id,
            actor_username,
            verb: notification.verb,
            target_type: notification.target_type,
            target_id: notification.target_id,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}
