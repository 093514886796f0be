use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::community::{CommunityProfile, UpsertCommunityRequest},
    services::community,
    state::SharedStore,
    utils::jwt::Claims,
};

/// Create a community, or update one the caller created.
pub async fn upsert_community(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpsertCommunityRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = CommunityProfile {
        id,
        username: payload.username,
        name: payload.name,
        bio: payload.bio,
        image: payload.image,
        created_by: Some(claims.user_id().to_string()),
    };

    Ok(Json(community::upsert_community(store.as_ref(), profile).await?))
}

pub async fn get_community(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(community::fetch_community(store.as_ref(), &id).await?))
}
