//! Feed service
//!
//! The home feed is a direct filtered scan: posts whose author is in
//! the set of users the requester follows, newest first. No ranking,
//! no deduplication, no caching.

use std::sync::Arc;

use crate::data::{Database, Post};
use crate::error::AppError;

/// Feed service
pub struct FeedService {
    db: Arc<Database>,
}

impl FeedService {
    /// Create new feed service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get a page of the user's home feed
    ///
    /// # Returns
    /// The page of posts and the total feed size.
    pub async fn home_feed(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64), AppError> {
        let posts = self.db.feed_posts(user_id, limit, offset).await?;
        let total = self.db.count_feed_posts(user_id).await?;
        Ok((posts, total))
    }
}
