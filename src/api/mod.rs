//! HTTP API
//!
//! Route table plus request-level metrics. Authentication is handled
//! by the `CurrentUser` extractor in the handlers themselves, so the
//! whole API lives in one router.

pub mod accounts;
pub mod dto;
pub mod feed;
pub mod metrics;
pub mod notifications;
pub mod pagination;
pub mod posts;

pub use metrics::metrics_router;

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::{get, post},
};

use crate::AppState;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

/// Build the `/api` router
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/accounts/register", post(accounts::register))
        .route("/accounts/login", post(accounts::login))
        .route(
            "/accounts/profile",
            get(accounts::get_profile)
                .put(accounts::update_profile)
                .patch(accounts::update_profile),
        )
        // Follow and unfollow are the same toggle
        .route("/accounts/follow/:user_id", post(accounts::toggle_follow))
        .route("/accounts/unfollow/:user_id", post(accounts::toggle_follow))
        // Posts
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/:post_id",
            get(posts::get_post)
                .put(posts::update_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        // Like and unlike are the same toggle
        .route("/posts/:post_id/like", post(posts::toggle_like))
        .route("/posts/:post_id/unlike", post(posts::toggle_like))
        // Comments
        .route(
            "/posts/:post_id/comments",
            get(posts::list_comments).post(posts::create_comment),
        )
        .route(
            "/posts/:post_id/comments/:comment_id",
            get(posts::get_comment)
                .put(posts::update_comment)
                .patch(posts::update_comment)
                .delete(posts::delete_comment),
        )
        // Feed and notifications
        .route("/feed", get(feed::home_feed))
        .route("/notifications", get(notifications::list_notifications))
}

/// Record request count and duration for every request
///
/// The matched route pattern is used as the endpoint label to keep
/// label cardinality bounded.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let start = std::time::Instant::now();
    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &endpoint, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &endpoint])
        .observe(start.elapsed().as_secs_f64());

    response
}
