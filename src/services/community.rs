// src/services/community.rs

use crate::{
    error::{AppError, AppResult},
    models::community::{Community, CommunityProfile},
    store::EntityStore,
};

/// Creates a community owned by `profile.created_by`, or updates it if
/// that user already owns it.
pub async fn upsert_community(
    store: &dyn EntityStore,
    mut profile: CommunityProfile,
) -> AppResult<Community> {
    profile.username = profile.username.to_lowercase();

    let existing = store
        .find_community(&profile.id)
        .await
        .map_err(|e| e.context("load community", &profile.id))?;
    if let Some(existing) = existing {
        if existing.created_by.is_some() && existing.created_by != profile.created_by {
            return Err(AppError::Forbidden(
                "Only the creator can edit this community".to_string(),
            ));
        }
    }

    let community = store
        .upsert_community(&profile)
        .await
        .map_err(|e| e.context("upsert community", &profile.id))?;
    tracing::info!(community_id = %community.id, "Community saved");

    Ok(community)
}

pub async fn fetch_community(store: &dyn EntityStore, community_id: &str) -> AppResult<Community> {
    store
        .find_community(community_id)
        .await
        .map_err(|e| e.context("load community", community_id))?
        .ok_or(AppError::NotFound("Community not found".to_string()))
}
