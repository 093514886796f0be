// src/services/post.rs

use crate::{
    error::{AppError, AppResult},
    models::post::Post,
    store::EntityStore,
    utils::revalidate::PathRevalidator,
};

/// Creates a top-level post and records it on its author and community.
///
/// An unknown `community_id` falls back to a personal post.
pub async fn create_post(
    store: &dyn EntityStore,
    revalidator: &dyn PathRevalidator,
    text: String,
    author_id: &str,
    community_id: Option<&str>,
    path: &str,
) -> AppResult<Post> {
    store
        .find_user(author_id)
        .await
        .map_err(|e| e.context("load author", author_id))?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let community_id = match community_id {
        Some(id) => {
            let found = store
                .find_community(id)
                .await
                .map_err(|e| e.context("load community", id))?;
            if found.is_none() {
                tracing::warn!(community_id = id, "Unknown community, creating personal post");
            }
            found.map(|c| c.id)
        }
        None => None,
    };

    let post = Post::new(text, author_id.to_string(), community_id, None);
    store
        .insert_post(&post)
        .await
        .map_err(|e| e.context("insert post", &post.id))?;

    store
        .push_user_post(author_id, &post.id)
        .await
        .map_err(|e| e.context("link post to author", author_id))?;

    if let Some(community_id) = &post.community_id {
        store
            .push_community_post(community_id, &post.id)
            .await
            .map_err(|e| e.context("link post to community", community_id))?;
    }

    revalidator.revalidate(path);
    tracing::info!(post_id = %post.id, author_id, "Post created");

    Ok(post)
}
