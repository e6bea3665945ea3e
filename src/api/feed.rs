//! Home feed endpoint

use axum::{
    Json,
    extract::{Query, State},
};

use crate::AppState;
use crate::api::dto::PostResponse;
use crate::api::pagination::{Page, PageParams};
use crate::api::posts::to_post_response;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{FeedService, PostService};

/// GET /api/feed
///
/// Posts by users the caller follows, newest first.
pub async fn home_feed(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<PostResponse>>, AppError> {
    let window = params.resolve(&state.config.pagination)?;

    let feed = FeedService::new(state.db.clone());
    let (posts, total) = feed
        .home_feed(&user.id, window.limit(), window.offset())
        .await?;

    let post_service = PostService::new(state.db.clone());
    let mut results = Vec::with_capacity(posts.len());
    for post in posts {
        results.push(to_post_response(&state, &post_service, post).await?);
    }

    Ok(Json(Page::new(window, total, results)))
}
