//! Notification service
//!
//! Append-only event log. Emission is synchronous within the request
//! that triggered it; there is no queue and no retry. Listing marks
//! everything unread as read.

use std::sync::Arc;

use crate::data::{Database, EntityId, Notification, NotificationVerb, TargetType};
use crate::error::AppError;
use crate::metrics::NOTIFICATIONS_TOTAL;

/// Notification service
pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    /// Create new notification service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Emit a notification
    ///
    /// Silently skipped when actor == recipient: users are never
    /// notified about their own actions.
    pub async fn emit(
        &self,
        actor_id: &str,
        recipient_id: &str,
        verb: NotificationVerb,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<(), AppError> {
        if actor_id == recipient_id {
            return Ok(());
        }

        let notification = Notification {
            id: EntityId::new().0,
            recipient_id: recipient_id.to_string(),
            actor_id: actor_id.to_string(),
            verb: verb.as_str().to_string(),
            target_type: target_type.as_str().to_string(),
            target_id: target_id.to_string(),
            read: false,
            created_at: chrono::Utc::now(),
        };

        self.db.insert_notification(&notification).await?;
        NOTIFICATIONS_TOTAL.with_label_values(&[verb.as_str()]).inc();

        tracing::debug!(
            recipient = %recipient_id,
            actor = %actor_id,
            verb = verb.as_str(),
            "Notification emitted"
        );

        Ok(())
    }

    /// List a page of notifications, newest first, then mark all of
    /// the recipient's unread notifications as read.
    ///
    /// The mark happens after the page is fetched, so the response
    /// still shows which items were unread at request time.
    ///
    /// # Returns
    /// The page of notifications and the total count for the recipient.
    pub async fn list_marking_read(
        &self,
        recipient_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let notifications = self
            .db
            .list_notifications(recipient_id, limit, offset)
            .await?;
        let total = self.db.count_notifications(recipient_id).await?;

        self.db.mark_all_notifications_read(recipient_id).await?;

        Ok((notifications, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::User;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn create_test_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-notification.db");
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
    async fn emit_skips_self_notification() {
        let (db, _temp_dir) = create_test_db().await;
        let service = NotificationService::new(db.clone());
        let alice = create_user(&db, "alice").await;

        service
            .emit(
                &alice.id,
                &alice.id,
                NotificationVerb::Liked,
                TargetType::Post,
                "post-1",
            )
            .await
            .unwrap();

        assert_eq!(db.count_notifications(&alice.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_marks_unread_as_read() {
        let (db, _temp_dir) = create_test_db().await;
        let service = NotificationService::new(db.clone());
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;

        for n in 0..3 {
            service
                .emit(
                    &bob.id,
                    &alice.id,
                    NotificationVerb::Liked,
                    TargetType::Post,
                    &format!("post-{}", n),
                )
                .await
                .unwrap();
        }

        let (page, total) = service.list_marking_read(&alice.id, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(total, 3);
        // Items were unread at request time
        assert!(page.iter().all(|n| !n.read));

        // The whole set is read afterwards, not just the listed page
        assert_eq!(db.count_unread_notifications(&alice.id).await.unwrap(), 0);

        let (page, _) = service.list_marking_read(&alice.id, 10, 0).await.unwrap();
        assert!(page.iter().all(|n| n.read));
    }
}
