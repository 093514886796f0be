// src/services/user.rs

use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserPage, UserPostsResponse, UserProfile},
    services::{feed::page_offset, tree},
    store::{EntityStore, SortOrder, UserQuery},
    utils::revalidate::PathRevalidator,
};

/// Only the profile editor's view is invalidated by a profile write.
const PROFILE_EDIT_PATH: &str = "/profile/edit";

/// Creates or updates a user's profile and marks them onboarded.
/// Usernames are stored lower-cased.
pub async fn update_user(
    store: &dyn EntityStore,
    revalidator: &dyn PathRevalidator,
    mut profile: UserProfile,
    path: &str,
) -> AppResult<User> {
    profile.username = profile.username.to_lowercase();

    let user = store
        .upsert_user(&profile)
        .await
        .map_err(|e| e.context("upsert user", &profile.id))?;

    if path == PROFILE_EDIT_PATH {
        revalidator.revalidate(path);
    }
    tracing::info!(user_id = %user.id, "User profile saved");

    Ok(user)
}

pub async fn fetch_user(store: &dyn EntityStore, user_id: &str) -> AppResult<User> {
    store
        .find_user(user_id)
        .await
        .map_err(|e| e.context("load user", user_id))?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Returns a user with their posts, in the order they were written, each
/// with one level of replies expanded.
pub async fn fetch_user_posts(store: &dyn EntityStore, user_id: &str) -> AppResult<UserPostsResponse> {
    let user = fetch_user(store, user_id).await?;

    let mut by_id: HashMap<String, _> = store
        .find_posts(&user.posts)
        .await
        .map_err(|e| e.context("load user posts", user_id))?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();
    let ordered = user.posts.iter().filter_map(|id| by_id.remove(id)).collect();

    let posts = tree::expand(store, ordered, 1)
        .await
        .map_err(|e| e.context("expand user posts", user_id))?;

    Ok(UserPostsResponse { user, posts })
}

/// Searches every user except `current_user_id`.
///
/// `search` matches username or name, case-insensitively. `sort` is
/// `"asc"` or anything else for newest first.
pub async fn fetch_users(
    store: &dyn EntityStore,
    current_user_id: &str,
    search: Option<String>,
    page: i64,
    page_size: i64,
    sort: Option<&str>,
) -> AppResult<UserPage> {
    let skip = page_offset(page, page_size)?;

    let query = UserQuery {
        exclude_id: current_user_id.to_string(),
        search,
        sort: match sort {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        },
    };

    let users = store.search_users(&query, skip, page_size).await?;
    let total = store.count_users(&query).await?;
    let is_next = total > skip + users.len() as i64;

    Ok(UserPage { users, is_next })
}
