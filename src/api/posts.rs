//! Post, comment, and like endpoints
//!
//! Reads are public; writes require a bearer token. Responses carry
//! the author's username and the post's like/comment counts.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::AppState;
use crate::api::dto::{
    CommentRequest, CommentResponse, CreatePostRequest, LikeToggleResponse, PostResponse,
    UpdatePostRequest,
};
use crate::api::pagination::{Page, PageParams};
use crate::auth::CurrentUser;
use crate::data::{Comment, Post};
use crate::error::AppError;
use crate::service::PostService;

fn build_post_service(state: &AppState) -> PostService {
    PostService::new(state.db.clone())
}

async fn username_of(state: &AppState, user_id: &str) -> Result<String, AppError> {
    let user = state.db.get_user(user_id).await?.ok_or(AppError::NotFound)?;
    Ok(user.username)
}

pub(super) async fn to_post_response(
    state: &AppState,
    service: &PostService,
    post: Post,
) -> Result<PostResponse, AppError> {
    let author_username = username_of(state, &post.author_id).await?;
    let (likes_count, comments_count) = service.post_counts(&post.id).await?;
    Ok(PostResponse::new(
        post,
        author_username,
        likes_count,
        comments_count,
    ))
}

async fn to_comment_response(
    state: &AppState,
    comment: Comment,
) -> Result<CommentResponse, AppError> {
    let author_username = username_of(state, &comment.author_id).await?;
    Ok(CommentResponse::new(comment, author_username))
}

// =============================================================================
// Posts
// =============================================================================

/// Post listing query: pagination plus an optional search term
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

impl ListPostsParams {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListPostsParams>,
) -> Result<Json<Page<PostResponse>>, AppError> {
    let window = params.page_params().resolve(&state.config.pagination)?;
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    let service = build_post_service(&state);
    let (posts, total) = service
        .list_posts(search, window.limit(), window.offset())
        .await?;

    let mut results = Vec::with_capacity(posts.len());
    for post in posts {
        results.push(to_post_response(&state, &service, post).await?);
    }

    Ok(Json(Page::new(window, total, results)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let service = build_post_service(&state);
    let post = service
        .create_post(&user, &request.title, &request.content)
        .await?;

    let response = to_post_response(&state, &service, post).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/posts/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let service = build_post_service(&state);
    let post = service.get_post(&post_id).await?;
    Ok(Json(to_post_response(&state, &service, post).await?))
}

/// PUT/PATCH /api/posts/:post_id
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    let service = build_post_service(&state);
    let post = service
        .update_post(
            &user,
            &post_id,
            request.title.as_deref(),
            request.content.as_deref(),
        )
        .await?;
    Ok(Json(to_post_response(&state, &service, post).await?))
}

/// DELETE /api/posts/:post_id
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = build_post_service(&state);
    service.delete_post(&user, &post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/:post_id/like and /api/posts/:post_id/unlike
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Json<LikeToggleResponse>, AppError> {
    let service = build_post_service(&state);
    let action = service.toggle_like(&user, &post_id).await?;

    Ok(Json(LikeToggleResponse {
        action: action.as_str(),
        post_id,
    }))
}

// =============================================================================
// Comments
// =============================================================================

/// GET /api/posts/:post_id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CommentResponse>>, AppError> {
    let window = params.resolve(&state.config.pagination)?;

    let service = build_post_service(&state);
    let (comments, total) = service
        .list_comments(&post_id, window.limit(), window.offset())
        .await?;

    let mut results = Vec::with_capacity(comments.len());
    for comment in comments {
        results.push(to_comment_response(&state, comment).await?);
    }

    Ok(Json(Page::new(window, total, results)))
}

/// POST /api/posts/:post_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let service = build_post_service(&state);
    let comment = service
        .create_comment(&user, &post_id, &request.content)
        .await?;

    let response = to_comment_response(&state, comment).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/posts/:post_id/comments/:comment_id
pub async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<CommentResponse>, AppError> {
    let service = build_post_service(&state);
    let comment = service.get_comment(&post_id, &comment_id).await?;
    Ok(Json(to_comment_response(&state, comment).await?))
}

/// PUT/PATCH /api/posts/:post_id/comments/:comment_id
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(String, String)>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let service = build_post_service(&state);
    let comment = service
        .update_comment(&user, &post_id, &comment_id, &request.content)
        .await?;
    Ok(Json(to_comment_response(&state, comment).await?))
}

/// DELETE /api/posts/:post_id/comments/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let service = build_post_service(&state);
    service.delete_comment(&user, &post_id, &comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
