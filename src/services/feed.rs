// src/services/feed.rs

use crate::{
    error::{AppError, AppResult},
    models::post::FeedPage,
    services::tree,
    store::EntityStore,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Number of rows to skip for a 1-based `page`.
///
/// Rejects non-positive input and pages that lie beyond `i64` range.
pub fn page_offset(page: i64, page_size: i64) -> AppResult<i64> {
    if page < 1 || page_size < 1 {
        return Err(AppError::BadRequest(
            "page and page_size must be positive".to_string(),
        ));
    }
    (page - 1)
        .checked_mul(page_size)
        .filter(|skip| skip.checked_add(page_size).is_some())
        .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))
}

/// Lists top-level posts newest first, one reply level expanded.
///
/// `page` starts at 1. `is_next` tells whether more posts follow this page.
pub async fn list_top_level(
    store: &dyn EntityStore,
    page: i64,
    page_size: i64,
) -> AppResult<FeedPage> {
    let skip = page_offset(page, page_size)?;

    let posts = store.list_top_level(skip, page_size).await?;
    let total = store.count_top_level().await?;
    let is_next = total > skip + posts.len() as i64;

    let posts = tree::expand(store, posts, 1).await?;

    Ok(FeedPage { posts, is_next })
}
