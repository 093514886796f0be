// src/services/tree.rs

//! Materializes posts together with their authors, communities and replies.

use std::collections::{BTreeSet, HashMap};

use crate::{
    error::{AppError, AppResult},
    models::{
        community::CommunitySummary,
        post::{ChildRef, Post, PostNode},
        user::AuthorSummary,
    },
    store::EntityStore,
};

/// Reply levels expanded below a post on its detail view: the post's
/// replies and their replies. Anything deeper comes back as bare ids.
pub const DETAIL_DEPTH: usize = 2;

/// Loads a post and its reply tree, `DETAIL_DEPTH` levels deep.
///
/// An existing post without replies is returned with empty `children`;
/// only a missing root is `NotFound`. Nothing is written.
pub async fn resolve(store: &dyn EntityStore, post_id: &str) -> AppResult<PostNode> {
    let root = store
        .find_post(post_id)
        .await
        .map_err(|e| e.context("resolve post", post_id))?
        .ok_or_else(AppError::post_not_found)?;

    expand(store, vec![root], DETAIL_DEPTH)
        .await
        .map_err(|e| e.context("resolve post", post_id))?
        .pop()
        .ok_or_else(AppError::post_not_found)
}

/// Expands `roots` into display nodes, keeping their order.
///
/// Every node at or above `depth` gets its author and community; replies
/// are expanded `depth` levels below the roots. Replies at the last
/// expanded level keep their own `children` as unresolved ids. Child ids
/// that no longer resolve to a post are dropped from the view.
pub async fn expand(
    store: &dyn EntityStore,
    roots: Vec<Post>,
    depth: usize,
) -> AppResult<Vec<PostNode>> {
    // Fetch level by level, one query per level.
    let mut levels: Vec<Vec<Post>> = vec![roots];
    while levels.len() <= depth {
        let child_ids: Vec<String> = levels
            .last()
            .map(|level| level.iter().flat_map(|p| p.children.iter().cloned()).collect())
            .unwrap_or_default();
        if child_ids.is_empty() {
            break;
        }
        levels.push(store.find_posts(&child_ids).await?);
    }

    let author_ids: Vec<String> = levels
        .iter()
        .flatten()
        .map(|p| p.author_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let community_ids: Vec<String> = levels
        .iter()
        .flatten()
        .filter_map(|p| p.community_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<String, AuthorSummary> = store
        .find_users(&author_ids)
        .await?
        .iter()
        .map(|u| (u.id.clone(), AuthorSummary::from(u)))
        .collect();
    let communities: HashMap<String, CommunitySummary> = store
        .find_communities(&community_ids)
        .await?
        .iter()
        .map(|c| (c.id.clone(), CommunitySummary::from(c)))
        .collect();

    // Assemble bottom-up so each level can take its children from the one below.
    let mut below: HashMap<String, PostNode> = HashMap::new();
    let mut roots_out = Vec::new();
    for (level, posts) in levels.into_iter().enumerate().rev() {
        let mut built: Vec<PostNode> = Vec::with_capacity(posts.len());
        for post in posts {
            let mut children = Vec::with_capacity(post.children.len());
            for child_id in &post.children {
                if level < depth {
                    match below.remove(child_id) {
                        Some(node) => children.push(ChildRef::Resolved(Box::new(node))),
                        None => tracing::debug!(
                            parent = %post.id,
                            child = %child_id,
                            "Skipping reply that no longer exists"
                        ),
                    }
                } else {
                    children.push(ChildRef::Unresolved(child_id.clone()));
                }
            }

            built.push(PostNode {
                author: authors.get(&post.author_id).cloned(),
                community: post
                    .community_id
                    .as_ref()
                    .and_then(|id| communities.get(id).cloned()),
                id: post.id,
                text: post.text,
                parent_id: post.parent_id,
                children,
                created_at: post.created_at,
            });
        }

        if level == 0 {
            roots_out = built;
        } else {
            below = built.into_iter().map(|n| (n.id.clone(), n)).collect();
        }
    }

    Ok(roots_out)
}
