//! Post service
//!
//! Post and comment CRUD with author-scoped permissions, and the
//! like/unlike toggle.

use std::sync::Arc;

use crate::data::{
    Comment, Database, EntityId, Like, NotificationVerb, Post, TargetType, User,
};
use crate::error::AppError;
use crate::metrics::POSTS_TOTAL;
use crate::service::NotificationService;

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Unliked => "unliked",
        }
    }
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self { db, notifications }
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Create a post authored by `author`
    pub async fn create_post(
        &self,
        author: &User,
        title: &str,
        content: &str,
    ) -> Result<Post, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(AppError::Validation("content cannot be empty".to_string()));
        }

        let now = chrono::Utc::now();
        let post = Post {
            id: EntityId::new().0,
            author_id: author.id.clone(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_post(&post).await?;
        POSTS_TOTAL.inc();

        tracing::debug!(author = %author.username, post = %post.id, "Post created");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, id: &str) -> Result<Post, AppError> {
        self.db.get_post(id).await?.ok_or(AppError::NotFound)
    }

    /// Update a post
    ///
    /// Only the author may update; anyone else gets Forbidden.
    pub async fn update_post(
        &self,
        actor: &User,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post, AppError> {
        let post = self.get_post(id).await?;
        if post.author_id != actor.id {
            return Err(AppError::Forbidden);
        }

        if let Some(title) = title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("title cannot be empty".to_string()));
            }
        }
        if let Some(content) = content {
            if content.trim().is_empty() {
                return Err(AppError::Validation("content cannot be empty".to_string()));
            }
        }

        if title.is_none() && content.is_none() {
            return Ok(post);
        }

        let updated = self
            .db
            .update_post(id, title.map(str::trim), content, chrono::Utc::now())
            .await?;
        if !updated {
            return Err(AppError::NotFound);
        }

        self.get_post(id).await
    }

    /// Delete a post
    ///
    /// Only the author may delete. Comments and likes go with it.
    pub async fn delete_post(&self, actor: &User, id: &str) -> Result<(), AppError> {
        let post = self.get_post(id).await?;
        if post.author_id != actor.id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_post(id).await?;
        POSTS_TOTAL.dec();

        tracing::debug!(author = %actor.username, post = %id, "Post deleted");
        Ok(())
    }

    /// List posts, newest first, with optional search
    ///
    /// # Returns
    /// The page of posts and the total match count.
    pub async fn list_posts(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64), AppError> {
        let posts = self.db.list_posts(search, limit, offset).await?;
        let total = self.db.count_posts(search).await?;
        Ok((posts, total))
    }

    /// Count likes and comments on a post, for response enrichment
    pub async fn post_counts(&self, post_id: &str) -> Result<(i64, i64), AppError> {
        let likes = self.db.count_likes(post_id).await?;
        let comments = self.db.count_comments(post_id).await?;
        Ok((likes, comments))
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Create a comment on a post
    ///
    /// Notifies the post author unless they commented themselves.
    pub async fn create_comment(
        &self,
        actor: &User,
        post_id: &str,
        content: &str,
    ) -> Result<Comment, AppError> {
        let post = self.get_post(post_id).await?;

        if content.trim().is_empty() {
            return Err(AppError::Validation("content cannot be empty".to_string()));
        }

        let now = chrono::Utc::now();
        let comment = Comment {
            id: EntityId::new().0,
            post_id: post.id.clone(),
            author_id: actor.id.clone(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_comment(&comment).await?;

        self.notifications
            .emit(
                &actor.id,
                &post.author_id,
                NotificationVerb::Commented,
                TargetType::Comment,
                &comment.id,
            )
            .await?;

        Ok(comment)
    }

    /// Get a comment, scoped to its post
    ///
    /// A valid comment ID under the wrong post is NotFound.
    pub async fn get_comment(&self, post_id: &str, id: &str) -> Result<Comment, AppError> {
        let comment = self.db.get_comment(id).await?.ok_or(AppError::NotFound)?;
        if comment.post_id != post_id {
            return Err(AppError::NotFound);
        }
        Ok(comment)
    }

    /// Update a comment (author only)
    pub async fn update_comment(
        &self,
        actor: &User,
        post_id: &str,
        id: &str,
        content: &str,
    ) -> Result<Comment, AppError> {
        let comment = self.get_comment(post_id, id).await?;
        if comment.author_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("content cannot be empty".to_string()));
        }

        let updated = self
            .db
            .update_comment(id, content, chrono::Utc::now())
            .await?;
        if !updated {
            return Err(AppError::NotFound);
        }

        self.get_comment(post_id, id).await
    }

    /// Delete a comment (author only)
    pub async fn delete_comment(
        &self,
        actor: &User,
        post_id: &str,
        id: &str,
    ) -> Result<(), AppError> {
        let comment = self.get_comment(post_id, id).await?;
        if comment.author_id != actor.id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_comment(id).await?;
        Ok(())
    }

    /// List comments on a post, oldest first
    ///
    /// # Returns
    /// The page of comments and the total count for the post.
    pub async fn list_comments(
        &self,
        post_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), AppError> {
        // 404 for a missing post rather than an empty page
        self.get_post(post_id).await?;

        let comments = self.db.list_comments(post_id, limit, offset).await?;
        let total = self.db.count_comments(post_id).await?;
        Ok((comments, total))
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Toggle the like relation from `actor` to the post
    ///
    /// Existence-check-then-flip; the unique index on (user, post)
    /// guarantees at most one like per pair even under a concurrent
    /// duplicate insert. Notifies the post author only on the
    /// transition to "liked", and never for their own posts.
    pub async fn toggle_like(&self, actor: &User, post_id: &str) -> Result<LikeAction, AppError> {
        let post = self.get_post(post_id).await?;

        if self.db.delete_like(&actor.id, &post.id).await? {
            tracing::debug!(user = %actor.username, post = %post.id, "Unliked");
            return Ok(LikeAction::Unliked);
        }

        let like = Like {
            id: EntityId::new().0,
            user_id: actor.id.clone(),
            post_id: post.id.clone(),
            created_at: chrono::Utc::now(),
        };
        let inserted = self.db.insert_like(&like).await?;

        if inserted {
            self.notifications
                .emit(
                    &actor.id,
                    &post.author_id,
                    NotificationVerb::Liked,
                    TargetType::Post,
                    &post.id,
                )
                .await?;
        }

        tracing::debug!(user = %actor.username, post = %post.id, "Liked");
        Ok(LikeAction::Liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn create_test_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-post.db");
        let db = Database::connect(&db_path).await.unwrap();
        (Arc::new(db), temp_dir)
    }

    async fn create_user(db: &Database, username: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            email: String::new(),
            password_hash: "hash".to_string(),
            bio: String::new(),
            created_at: now,
            updated_at: now,
        };
        db.insert_user(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn create_and_update_post_validates_input() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());
        let alice = create_user(&db, "alice").await;

        let empty_title = service.create_post(&alice, "  ", "body").await.unwrap_err();
        assert!(matches!(empty_title, AppError::Validation(_)));

        let post = service
            .create_post(&alice, " Hello ", "first post")
            .await
            .unwrap();
        assert_eq!(post.title, "Hello");

        let updated = service
            .update_post(&alice, &post.id, Some("Renamed"), None)
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, "first post");
    }

    #[tokio::test]
    async fn only_author_may_mutate_post() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;

        let post = service.create_post(&alice, "Hello", "body").await.unwrap();

        let update = service
            .update_post(&bob, &post.id, Some("Hacked"), None)
            .await
            .unwrap_err();
        assert!(matches!(update, AppError::Forbidden));

        let delete = service.delete_post(&bob, &post.id).await.unwrap_err();
        assert!(matches!(delete, AppError::Forbidden));

        service.delete_post(&alice, &post.id).await.unwrap();
        let gone = service.get_post(&post.id).await.unwrap_err();
        assert!(matches!(gone, AppError::NotFound));
    }

    #[tokio::test]
    async fn toggle_like_alternates_and_count_stays_bounded() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;

        let post = service.create_post(&alice, "Hello", "body").await.unwrap();

        for round in 0..3 {
            let action = service.toggle_like(&bob, &post.id).await.unwrap();
            assert_eq!(action, LikeAction::Liked, "round {}", round);
            assert_eq!(
                db.count_user_post_likes(&bob.id, &post.id).await.unwrap(),
                1
            );

            let action = service.toggle_like(&bob, &post.id).await.unwrap();
            assert_eq!(action, LikeAction::Unliked, "round {}", round);
            assert_eq!(
                db.count_user_post_likes(&bob.id, &post.id).await.unwrap(),
                0
            );
        }
    }

    #[tokio::test]
    async fn like_notifies_author_but_not_self() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;

        let post = service.create_post(&alice, "Hello", "body").await.unwrap();

        // Liking your own post does not notify
        service.toggle_like(&alice, &post.id).await.unwrap();
        assert_eq!(db.count_notifications(&alice.id).await.unwrap(), 0);

        // Another user's like notifies the author, once per transition
        service.toggle_like(&bob, &post.id).await.unwrap();
        assert_eq!(db.count_notifications(&alice.id).await.unwrap(), 1);

        service.toggle_like(&bob, &post.id).await.unwrap(); // unlike
        service.toggle_like(&bob, &post.id).await.unwrap(); // like again
        assert_eq!(db.count_notifications(&alice.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn comments_are_scoped_to_their_post() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;

        let first = service.create_post(&alice, "First", "body").await.unwrap();
        let second = service.create_post(&alice, "Second", "body").await.unwrap();

        let comment = service
            .create_comment(&bob, &first.id, "nice post")
            .await
            .unwrap();

        // Commenting notified the post author
        assert_eq!(db.count_notifications(&alice.id).await.unwrap(), 1);

        // Valid comment ID under the wrong post is NotFound
        let wrong_post = service
            .get_comment(&second.id, &comment.id)
            .await
            .unwrap_err();
        assert!(matches!(wrong_post, AppError::NotFound));

        // Author-scoped mutation
        let forbidden = service
            .update_comment(&alice, &first.id, &comment.id, "edited")
            .await
            .unwrap_err();
        assert!(matches!(forbidden, AppError::Forbidden));

        let edited = service
            .update_comment(&bob, &first.id, &comment.id, "edited")
            .await
            .unwrap();
        assert_eq!(edited.content, "edited");

        service
            .delete_comment(&bob, &first.id, &comment.id)
            .await
            .unwrap();
        let (comments, total) = service.list_comments(&first.id, 10, 0).await.unwrap();
        assert!(comments.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn list_comments_on_missing_post_is_not_found() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());

        let error = service.list_comments("missing", 10, 0).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound));
    }

    #[tokio::test]
    async fn list_posts_searches_and_counts() {
        let (db, _temp_dir) = create_test_db().await;
        let service = PostService::new(db.clone());
        let alice = create_user(&db, "alice").await;

        service
            .create_post(&alice, "Rust tips", "tricks")
            .await
            .unwrap();
        service
            .create_post(&alice, "Gardening", "soil and rust-colored leaves")
            .await
            .unwrap();
        service
            .create_post(&alice, "Cooking", "pasta")
            .await
            .unwrap();

        let (all, total) = service.list_posts(None, 10, 0).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(total, 3);

        let (matched, total) = service.list_posts(Some("rust"), 10, 0).await.unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(total, 2);
    }
}
