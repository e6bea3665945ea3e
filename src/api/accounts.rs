//! Account endpoints
//!
//! Registration, login, the caller's own profile, and the
//! follow/unfollow toggle.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::api::dto::{
    FollowToggleResponse, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, UpdateProfileRequest,
};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::AccountService;

fn build_account_service(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), state.config.auth.token_secret.clone())
}

/// POST /api/accounts/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let service = build_account_service(&state);
    let (user, token) = service
        .register(
            &request.username,
            &request.email,
            &request.password,
            &request.bio,
        )
        .await?;

    let response = RegisterResponse {
        user: user.into(),
        token,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/accounts/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = build_account_service(&state);
    let (user, token) = service.login(&request.username, &request.password).await?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
    }))
}

/// GET /api/accounts/profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let service = build_account_service(&state);
    let profile = service.profile_of(user).await?;
    Ok(Json(profile.into()))
}

/// PUT/PATCH /api/accounts/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let service = build_account_service(&state);
    let profile = service
        .update_profile(&user.id, request.email, request.bio)
        .await?;
    Ok(Json(profile.into()))
}

/// POST /api/accounts/follow/:user_id and /api/accounts/unfollow/:user_id
pub async fn toggle_follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<FollowToggleResponse>, AppError> {
    let service = build_account_service(&state);
    let action = service.toggle_follow(&user, &user_id).await?;

    Ok(Json(FollowToggleResponse {
        action: action.as_str(),
        user_id,
    }))
}
