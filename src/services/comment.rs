// src/services/comment.rs

use crate::{
    error::{AppError, AppResult},
    models::post::Post,
    store::EntityStore,
    utils::revalidate::PathRevalidator,
};

/// Appends a reply under `parent_id`.
///
/// The reply is stored before the parent references it, so readers never
/// see a child id that does not resolve. If the parent vanishes between
/// the check and the link, the reply is removed again and `NotFound` is
/// returned.
pub async fn append_comment(
    store: &dyn EntityStore,
    revalidator: &dyn PathRevalidator,
    parent_id: &str,
    text: String,
    author_id: &str,
    path: &str,
) -> AppResult<Post> {
    store
        .find_post(parent_id)
        .await
        .map_err(|e| e.context("load parent post", parent_id))?
        .ok_or_else(AppError::post_not_found)?;

    let comment = Post::new(text, author_id.to_string(), None, Some(parent_id.to_string()));
    store
        .insert_post(&comment)
        .await
        .map_err(|e| e.context("insert comment", parent_id))?;

    let linked = store
        .push_child(parent_id, &comment.id)
        .await
        .map_err(|e| e.context("link comment", parent_id))?;
    if !linked {
        tracing::warn!(parent_id, comment_id = %comment.id, "Parent deleted while commenting");
        store
            .delete_posts(std::slice::from_ref(&comment.id))
            .await
            .map_err(|e| e.context("discard orphan comment", &comment.id))?;
        return Err(AppError::post_not_found());
    }

    revalidator.revalidate(path);
    tracing::info!(parent_id, comment_id = %comment.id, "Comment added");

    Ok(comment)
}
