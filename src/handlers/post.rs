// src/handlers/post.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{CreateCommentRequest, CreatePostRequest, DeletePostParams, FeedParams},
    services::{cascade, comment, feed, post, tree},
    state::{SharedRevalidator, SharedStore},
    store::EntityStore,
    utils::{html::clean_post_text, jwt::Claims},
};

/// List top-level posts (Recent first).
/// Supports page-based pagination.
pub async fn list_posts(
    State(store): State<SharedStore>,
    Query(params): Query<FeedParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(feed::DEFAULT_PAGE_SIZE);

    let result = feed::list_top_level(store.as_ref(), page, page_size).await?;

    Ok(Json(result))
}

/// Create a new top-level post as the caller.
pub async fn create_post(
    State(store): State<SharedStore>,
    State(revalidator): State<SharedRevalidator>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let text = clean_post_text(&payload.text)?;

    let created = post::create_post(
        store.as_ref(),
        revalidator.as_ref(),
        text,
        claims.user_id(),
        payload.community_id.as_deref(),
        &payload.path,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": created.id }))))
}

/// Get a single post with its reply tree.
pub async fn get_post(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let node = tree::resolve(store.as_ref(), &id).await?;

    Ok(Json(node))
}

/// Delete a post and every reply beneath it.
/// Requires: Login + Author.
pub async fn delete_post(
    State(store): State<SharedStore>,
    State(revalidator): State<SharedRevalidator>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Query(params): Query<DeletePostParams>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Fetch Post to check ownership
    let target = store
        .find_post(&id)
        .await
        .map_err(|e| e.context("load post for delete", &id))?
        .ok_or_else(AppError::post_not_found)?;

    // 2. Check Permission
    if target.author_id != claims.user_id() {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this post".to_string(),
        ));
    }

    // 3. Cascade
    cascade::delete_subtree(store.as_ref(), revalidator.as_ref(), &id, &params.path).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Reply to a post as the caller.
pub async fn create_comment(
    State(store): State<SharedStore>,
    State(revalidator): State<SharedRevalidator>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let text = clean_post_text(&payload.text)?;

    let created = comment::append_comment(
        store.as_ref(),
        revalidator.as_ref(),
        &post_id,
        text,
        claims.user_id(),
        &payload.path,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": created.id })),
    ))
}
