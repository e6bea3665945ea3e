//! Notification endpoint

use axum::{
    Json,
    extract::{Query, State},
};

use crate::AppState;
use crate::api::dto::NotificationResponse;
use crate::api::pagination::{Page, PageParams};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::NotificationService;

/// GET /api/notifications
///
/// Lists the caller's notifications, newest first, then marks all of
/// their unread notifications as read. The `read` flags in the
/// response reflect the state at request time.
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<NotificationResponse>>, AppError> {
    let window = params.resolve(&state.config.pagination)?;

    let service = NotificationService::new(state.db.clone());
    let (notifications, total) = service
        .list_marking_read(&user.id, window.limit(), window.offset())
        .await?;

    let mut results = Vec::with_capacity(notifications.len());
    for notification in notifications {
        let actor = state
            .db
            .get_user(&notification.actor_id)
            .await?
            .ok_or(AppError::NotFound)?;
        results.push(NotificationResponse::new(notification, actor.username));
    }

    Ok(Json(Page::new(window, total, results)))
}
