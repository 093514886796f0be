// src/store/mod.rs

//! Persistence boundary for the three document collections.
//!
//! Services only talk to `dyn EntityStore`; the handle is built once in
//! `main` and shared through `AppState`.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        community::{Community, CommunityProfile},
        post::Post,
        user::{User, UserProfile},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Sort order for user listings (by creation time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filter for user search.
#[derive(Debug, Clone)]
pub struct UserQuery {
    /// Never returned in results (usually the caller).
    pub exclude_id: String,
    /// Case-insensitive substring of username or name.
    pub search: Option<String>,
    pub sort: SortOrder,
}

/// Everything a subtree deletion touches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtreeRemoval {
    /// Root and all descendants.
    pub post_ids: Vec<String>,
    pub author_ids: Vec<String>,
    pub community_ids: Vec<String>,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    // Posts
    async fn find_post(&self, id: &str) -> AppResult<Option<Post>>;
    /// Missing ids are skipped; order is unspecified.
    async fn find_posts(&self, ids: &[String]) -> AppResult<Vec<Post>>;
    /// All posts whose `parent_id` is one of `parent_ids`.
    async fn find_replies(&self, parent_ids: &[String]) -> AppResult<Vec<Post>>;
    async fn insert_post(&self, post: &Post) -> AppResult<()>;
    /// Appends `child_id` to the parent's `children`. Returns `false` if the
    /// parent does not exist.
    async fn push_child(&self, parent_id: &str, child_id: &str) -> AppResult<bool>;
    /// Top-level posts, newest first.
    async fn list_top_level(&self, offset: i64, limit: i64) -> AppResult<Vec<Post>>;
    async fn count_top_level(&self) -> AppResult<i64>;
    /// Deletes the given posts without touching any back-reference.
    async fn delete_posts(&self, ids: &[String]) -> AppResult<u64>;

    // Users
    async fn find_user(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<User>>;
    async fn upsert_user(&self, profile: &UserProfile) -> AppResult<User>;
    async fn push_user_post(&self, user_id: &str, post_id: &str) -> AppResult<bool>;
    async fn search_users(&self, query: &UserQuery, offset: i64, limit: i64)
    -> AppResult<Vec<User>>;
    async fn count_users(&self, query: &UserQuery) -> AppResult<i64>;

    // Communities
    async fn find_community(&self, id: &str) -> AppResult<Option<Community>>;
    async fn find_communities(&self, ids: &[String]) -> AppResult<Vec<Community>>;
    async fn upsert_community(&self, profile: &CommunityProfile) -> AppResult<Community>;
    async fn push_community_post(&self, community_id: &str, post_id: &str) -> AppResult<bool>;

    /// Deletes the posts, then strips their ids from every `children` list
    /// and from the given users' and communities' `posts`.
    ///
    /// Observed as one step by readers. Each part is a set-difference
    /// update, so re-running it against an already-cleaned store is a no-op.
    async fn remove_subtree(&self, removal: &SubtreeRemoval) -> AppResult<()>;
}
