// src/store/memory.rs

//! In-process `EntityStore` backed by hash maps behind one `RwLock`.
//!
//! Every trait call takes the lock once, so multi-collection updates such as
//! `remove_subtree` are never observed half-done.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        community::{Community, CommunityProfile},
        post::Post,
        user::{User, UserProfile},
    },
    store::{EntityStore, SortOrder, SubtreeRemoval, UserQuery},
};

/// Full contents of a `MemoryStore`, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySnapshot {
    pub posts: HashMap<String, Post>,
    pub users: HashMap<String, User>,
    pub communities: HashMap<String, Community>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemorySnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current contents, for inspection in tests and debugging.
    pub async fn snapshot(&self) -> MemorySnapshot {
        self.inner.read().await.clone()
    }
}

fn matches_query(user: &User, query: &UserQuery) -> bool {
    if user.id == query.exclude_id {
        return false;
    }
    match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            user.username.to_lowercase().contains(&term) || user.name.to_lowercase().contains(&term)
        }
        _ => true,
    }
}

fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("Username '{}' already exists", username))
}

fn page<T: Clone>(items: Vec<&T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_post(&self, id: &str) -> AppResult<Option<Post>> {
        Ok(self.inner.read().await.posts.get(id).cloned())
    }

    async fn find_posts(&self, ids: &[String]) -> AppResult<Vec<Post>> {
        let data = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| data.posts.get(id).cloned()).collect())
    }

    async fn find_replies(&self, parent_ids: &[String]) -> AppResult<Vec<Post>> {
        let parents: HashSet<&str> = parent_ids.iter().map(String::as_str).collect();
        let data = self.inner.read().await;
        Ok(data
            .posts
            .values()
            .filter(|p| p.parent_id.as_deref().is_some_and(|pid| parents.contains(pid)))
            .cloned()
            .collect())
    }

    async fn insert_post(&self, post: &Post) -> AppResult<()> {
        self.inner
            .write()
            .await
            .posts
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn push_child(&self, parent_id: &str, child_id: &str) -> AppResult<bool> {
        let mut data = self.inner.write().await;
        match data.posts.get_mut(parent_id) {
            Some(parent) => {
                parent.children.push(child_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_top_level(&self, offset: i64, limit: i64) -> AppResult<Vec<Post>> {
        let data = self.inner.read().await;
        let mut top: Vec<&Post> = data.posts.values().filter(|p| p.is_top_level()).collect();
        top.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(page(top, offset, limit))
    }

    async fn count_top_level(&self) -> AppResult<i64> {
        let data = self.inner.read().await;
        Ok(data.posts.values().filter(|p| p.is_top_level()).count() as i64)
    }

    async fn delete_posts(&self, ids: &[String]) -> AppResult<u64> {
        let mut data = self.inner.write().await;
        Ok(ids.iter().filter(|id| data.posts.remove(*id).is_some()).count() as u64)
    }

    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(id).cloned())
    }

    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let data = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| data.users.get(id).cloned()).collect())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> AppResult<User> {
        let mut data = self.inner.write().await;
        if data
            .users
            .values()
            .any(|u| u.username == profile.username && u.id != profile.id)
        {
            return Err(username_taken(&profile.username));
        }
        let user = data
            .users
            .entry(profile.id.clone())
            .or_insert_with(|| User {
                id: profile.id.clone(),
                username: String::new(),
                name: String::new(),
                bio: String::new(),
                image: String::new(),
                onboarded: false,
                posts: Vec::new(),
                created_at: Utc::now(),
            });
        user.username = profile.username.clone();
        user.name = profile.name.clone();
        user.bio = profile.bio.clone();
        user.image = profile.image.clone();
        user.onboarded = true;
        Ok(user.clone())
    }

    async fn push_user_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let mut data = self.inner.write().await;
        match data.users.get_mut(user_id) {
            Some(user) => {
                user.posts.push(post_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search_users(
        &self,
        query: &UserQuery,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<User>> {
        let data = self.inner.read().await;
        let mut hits: Vec<&User> = data.users.values().filter(|u| matches_query(u, query)).collect();
        hits.sort_by(|a, b| {
            let by_time = match query.sort {
                SortOrder::Asc => a.created_at.cmp(&b.created_at),
                SortOrder::Desc => b.created_at.cmp(&a.created_at),
            };
            by_time.then_with(|| a.id.cmp(&b.id))
        });
        Ok(page(hits, offset, limit))
    }

    async fn count_users(&self, query: &UserQuery) -> AppResult<i64> {
        let data = self.inner.read().await;
        Ok(data.users.values().filter(|u| matches_query(u, query)).count() as i64)
    }

    async fn find_community(&self, id: &str) -> AppResult<Option<Community>> {
        Ok(self.inner.read().await.communities.get(id).cloned())
    }

    async fn find_communities(&self, ids: &[String]) -> AppResult<Vec<Community>> {
        let data = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| data.communities.get(id).cloned())
            .collect())
    }

    async fn upsert_community(&self, profile: &CommunityProfile) -> AppResult<Community> {
        let mut data = self.inner.write().await;
        if data
            .communities
            .values()
            .any(|c| c.username == profile.username && c.id != profile.id)
        {
            return Err(username_taken(&profile.username));
        }
        let community = data
            .communities
            .entry(profile.id.clone())
            .or_insert_with(|| Community {
                id: profile.id.clone(),
                username: String::new(),
                name: String::new(),
                bio: String::new(),
                image: String::new(),
                created_by: profile.created_by.clone(),
                posts: Vec::new(),
                created_at: Utc::now(),
            });
        community.username = profile.username.clone();
        community.name = profile.name.clone();
        community.bio = profile.bio.clone();
        community.image = profile.image.clone();
        Ok(community.clone())
    }

    async fn push_community_post(&self, community_id: &str, post_id: &str) -> AppResult<bool> {
        let mut data = self.inner.write().await;
        match data.communities.get_mut(community_id) {
            Some(community) => {
                community.posts.push(post_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_subtree(&self, removal: &SubtreeRemoval) -> AppResult<()> {
        let doomed: HashSet<&str> = removal.post_ids.iter().map(String::as_str).collect();
        let mut data = self.inner.write().await;

        data.posts.retain(|id, _| !doomed.contains(id.as_str()));
        for post in data.posts.values_mut() {
            post.children.retain(|c| !doomed.contains(c.as_str()));
        }
        for user_id in &removal.author_ids {
            if let Some(user) = data.users.get_mut(user_id) {
                user.posts.retain(|p| !doomed.contains(p.as_str()));
            }
        }
        for community_id in &removal.community_ids {
            if let Some(community) = data.communities.get_mut(community_id) {
                community.posts.retain(|p| !doomed.contains(p.as_str()));
            }
        }
        Ok(())
    }
}
