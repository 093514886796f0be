// src/models/mod.rs

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub mod community;
pub mod post;
pub mod user;

/// Handles shared by users and communities.
pub(crate) static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username pattern"));

/// Validates that a profile image is either unset or a correctly formatted URL.
pub(crate) fn validate_image_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    if url.len() > 500 {
        return Err(validator::ValidationError::new("url_too_long"));
    }
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
