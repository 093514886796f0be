// src/handlers/user.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdateUserRequest, UserProfile, UserSearchParams},
    services::{feed::DEFAULT_PAGE_SIZE, user},
    state::{SharedRevalidator, SharedStore},
    utils::jwt::Claims,
};

/// Create or update the caller's profile (onboarding and profile edit).
pub async fn update_me(
    State(store): State<SharedStore>,
    State(revalidator): State<SharedRevalidator>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = UserProfile {
        id: claims.user_id().to_string(),
        username: payload.username,
        name: payload.name,
        bio: payload.bio,
        image: payload.image,
    };
    let saved = user::update_user(store.as_ref(), revalidator.as_ref(), profile, &payload.path).await?;

    Ok(Json(saved))
}

/// Get a user's profile.
pub async fn get_user(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user::fetch_user(store.as_ref(), &id).await?))
}

/// List a user's posts with their direct replies.
pub async fn list_user_posts(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user::fetch_user_posts(store.as_ref(), &id).await?))
}

/// Search other users by username or name.
pub async fn search_users(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<UserSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let page = user::fetch_users(
        store.as_ref(),
        claims.user_id(),
        params.search,
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        params.sort.as_deref(),
    )
    .await?;

    Ok(Json(page))
}
