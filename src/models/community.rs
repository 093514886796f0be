use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{USERNAME_RE, validate_image_url};

/// A stored community.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub created_by: Option<String>,

    /// Ids of top-level posts made into this community.
    pub posts: Vec<String>,

    pub created_at: DateTime<Utc>,
}

/// Community fields embedded in post views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunitySummary {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<&Community> for CommunitySummary {
    fn from(community: &Community) -> Self {
        Self {
            id: community.id.clone(),
            name: community.name.clone(),
            image: community.image.clone(),
        }
    }
}

/// Profile fields written by an upsert.
#[derive(Debug, Clone)]
pub struct CommunityProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub created_by: Option<String>,
}

/// DTO for creating or updating a community.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertCommunityRequest {
    #[validate(
        length(min = 3, max = 30),
        regex(
            path = *USERNAME_RE,
            message = "Username may only contain letters, digits and underscores."
        )
    )]
    pub username: String,

    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(max = 1000))]
    #[serde(default)]
    pub bio: String,

    #[validate(custom(function = validate_image_url))]
    #[serde(default)]
    pub image: String,
}
