use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{community::CommunitySummary, user::AuthorSummary};

/// A stored post document. Replies are posts whose `parent_id` is set.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub community_id: Option<String>,
    pub parent_id: Option<String>,

    /// Ids of direct replies, in the order they were appended.
    pub children: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        text: String,
        author_id: String,
        community_id: Option<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            text,
            author_id,
            community_id,
            parent_id,
            children: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A post with its references expanded for display.
#[derive(Debug, Clone, Serialize)]
pub struct PostNode {
    pub id: String,
    pub text: String,
    pub parent_id: Option<String>,
    /// `None` when the author document no longer exists.
    pub author: Option<AuthorSummary>,
    pub community: Option<CommunitySummary>,
    pub children: Vec<ChildRef>,
    pub created_at: DateTime<Utc>,
}

/// A reply slot inside a `PostNode`.
///
/// Replies below the expansion depth are returned as bare ids; callers
/// resolve again from that node to see them.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChildRef {
    Resolved(Box<PostNode>),
    Unresolved(String),
}

impl ChildRef {
    pub fn as_node(&self) -> Option<&PostNode> {
        match self {
            ChildRef::Resolved(node) => Some(node),
            ChildRef::Unresolved(_) => None,
        }
    }
}

/// DTO for creating a new top-level post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 3,
        max = 10000,
        message = "Post must be at least 3 characters long"
    ))]
    pub text: String,

    /// Community to post into; omitted for a personal post.
    pub community_id: Option<String>,

    /// View path to revalidate after the write.
    #[serde(default = "default_path")]
    pub path: String,
}

/// DTO for replying to an existing post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 3,
        max = 10000,
        message = "Comment must be at least 3 characters long"
    ))]
    pub text: String,

    #[serde(default = "default_path")]
    pub path: String,
}

/// Query parameters for deleting a post.
#[derive(Debug, Deserialize)]
pub struct DeletePostParams {
    #[serde(default = "default_path")]
    pub path: String,
}

/// Query parameters for the top-level feed.
#[derive(Debug, Deserialize, Validate)]
pub struct FeedParams {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

/// One page of top-level posts.
#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub posts: Vec<PostNode>,
    pub is_next: bool,
}

fn default_path() -> String {
    "/".to_string()
}
