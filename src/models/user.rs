// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{USERNAME_RE, post::PostNode, validate_image_url};

/// A stored user profile. `id` is the identity provider's subject.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    /// Unique, always lower-case.
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,

    /// Set once the user has completed their profile.
    pub onboarded: bool,

    /// Ids of top-level posts written by this user.
    pub posts: Vec<String>,

    pub created_at: DateTime<Utc>,
}

/// Author fields embedded in post views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// Profile fields written by an upsert.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
}

/// DTO for creating or updating the caller's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(
            min = 3,
            max = 30,
            message = "Username length must be between 3 and 30 characters."
        ),
        regex(
            path = *USERNAME_RE,
            message = "Username may only contain letters, digits and underscores."
        )
    )]
    pub username: String,

    #[validate(length(min = 1, max = 50, message = "Name length must be between 1 and 50 characters."))]
    pub name: String,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters."))]
    #[serde(default)]
    pub bio: String,

    #[validate(custom(function = validate_image_url))]
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub path: String,
}

/// Query parameters for searching users.
#[derive(Debug, Deserialize, Validate)]
pub struct UserSearchParams {
    #[validate(length(max = 100))]
    pub search: Option<String>,

    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,

    /// 'desc' (default) or 'asc' by creation time.
    pub sort: Option<String>,
}

/// One page of user search results.
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub is_next: bool,
}

/// A user together with their expanded posts.
#[derive(Debug, Serialize)]
pub struct UserPostsResponse {
    pub user: User,
    pub posts: Vec<PostNode>,
}
