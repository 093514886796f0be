// src/services/cascade.rs

//! Deletes a post together with every reply beneath it.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::{
    error::{AppError, AppResult},
    models::post::Post,
    store::{EntityStore, SubtreeRemoval},
    utils::revalidate::PathRevalidator,
};

/// Finds every transitive reply of `root_id`.
///
/// Walks the tree breadth-first with an explicit frontier queue, one store
/// query per level, so depth is bounded only by the data. Each id is
/// visited at most once.
pub async fn collect_descendants(store: &dyn EntityStore, root_id: &str) -> AppResult<Vec<Post>> {
    let mut visited: HashSet<String> = HashSet::from([root_id.to_string()]);
    let mut frontier: VecDeque<String> = VecDeque::from([root_id.to_string()]);
    let mut descendants = Vec::new();

    while !frontier.is_empty() {
        let batch: Vec<String> = frontier.drain(..).collect();
        for reply in store.find_replies(&batch).await? {
            if visited.insert(reply.id.clone()) {
                frontier.push_back(reply.id.clone());
                descendants.push(reply);
            }
        }
    }

    Ok(descendants)
}

/// Builds the id sets a removal must touch. Posts without a community
/// contribute nothing to `community_ids`.
pub fn plan_removal<'a>(posts: impl IntoIterator<Item = &'a Post>) -> SubtreeRemoval {
    let mut post_ids = Vec::new();
    let mut authors = BTreeSet::new();
    let mut communities = BTreeSet::new();

    for post in posts {
        post_ids.push(post.id.clone());
        if !post.author_id.is_empty() {
            authors.insert(post.author_id.clone());
        }
        if let Some(community_id) = &post.community_id {
            communities.insert(community_id.clone());
        }
    }

    SubtreeRemoval {
        post_ids,
        author_ids: authors.into_iter().collect(),
        community_ids: communities.into_iter().collect(),
    }
}

/// Deletes `post_id` and its whole reply subtree, then strips the removed
/// ids from parents' `children` and from users' and communities' `posts`.
///
/// A missing post is `NotFound` and leaves the store untouched, which also
/// makes a repeated call on the same id a no-op. Returns the number of
/// posts removed.
pub async fn delete_subtree(
    store: &dyn EntityStore,
    revalidator: &dyn PathRevalidator,
    post_id: &str,
    path: &str,
) -> AppResult<usize> {
    let root = store
        .find_post(post_id)
        .await
        .map_err(|e| e.context("load post for delete", post_id))?
        .ok_or_else(AppError::post_not_found)?;

    // Enumeration reaches its fixed point before anything is removed.
    let descendants = collect_descendants(store, post_id)
        .await
        .map_err(|e| e.context("collect replies", post_id))?;

    let removal = plan_removal(std::iter::once(&root).chain(descendants.iter()));
    tracing::debug!(
        post_id,
        posts = removal.post_ids.len(),
        authors = removal.author_ids.len(),
        communities = removal.community_ids.len(),
        "Removing post subtree"
    );

    store
        .remove_subtree(&removal)
        .await
        .map_err(|e| e.context("remove post subtree", post_id))?;

    let mut removed: Vec<String> = removal.post_ids;
    let late = sweep_late_replies(store, &removed, post_id).await?;
    removed.extend(late);

    revalidator.revalidate(path);
    tracing::info!(post_id, removed = removed.len(), "Post subtree deleted");

    Ok(removed.len())
}

/// Removes replies that were attached under already-removed posts while a
/// deletion was running. Repeats until no such reply is left and returns
/// the extra ids removed.
async fn sweep_late_replies(
    store: &dyn EntityStore,
    removed: &[String],
    post_id: &str,
) -> AppResult<Vec<String>> {
    let mut gone: Vec<String> = removed.to_vec();
    let mut swept = Vec::new();

    loop {
        let late = store
            .find_replies(&gone)
            .await
            .map_err(|e| e.context("sweep late replies", post_id))?;
        if late.is_empty() {
            return Ok(swept);
        }

        let mut subtree = Vec::new();
        for reply in &late {
            subtree.extend(collect_descendants(store, &reply.id).await?);
        }
        let removal = plan_removal(late.iter().chain(subtree.iter()));
        tracing::warn!(
            post_id,
            late = removal.post_ids.len(),
            "Removing replies created during delete"
        );

        store
            .remove_subtree(&removal)
            .await
            .map_err(|e| e.context("remove late replies", post_id))?;

        gone = removal.post_ids.clone();
        swept.extend(removal.post_ids);
    }
}
