//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// Credentials live here; the follow graph is in the `follows` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never exposed in responses
    pub password_hash: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Follow relationships
// =============================================================================

/// A follow edge: follower -> followed
///
/// Asymmetric; the reverse edge is a separate row.
/// UNIQUE(follower_id, followed_id) enforces set semantics.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub followed_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Post and Comment
// =============================================================================

/// A post, owned by exactly one author
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a post
///
/// Cascade-deleted when its post is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Like (user, post) join entity
///
/// UNIQUE(user_id, post_id) guarantees at most one like per pair.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Notification for user interactions
///
/// Append-only; `read` flips when the recipient lists their
/// notifications. Never created with actor == recipient.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub actor_id: String,
    /// Verb: followed, liked, commented
    pub verb: String,
    /// Target entity type: user, post, comment
    pub target_type: String,
    pub target_id: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVerb {
    Followed,
    Liked,
    Commented,
}

impl NotificationVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followed => "followed",
            Self::Liked => "liked",
            Self::Commented => "commented",
        }
    }
}

/// Notification target entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    User,
    Post,
    Comment,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

// =============================================================================
// Access tokens
// =============================================================================

/// Bearer token issued at registration/login
///
/// Only the keyed hash of the token is stored; the raw value is
/// returned to the client once and cannot be recovered.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessToken {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}
