// tests/user_service_tests.rs

use std::sync::Mutex;
use std::time::Duration;

use phorst::{
    error::AppError,
    models::user::UserProfile,
    services::{comment, post, user},
    store::MemoryStore,
    utils::revalidate::PathRevalidator,
};

#[derive(Default)]
struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl PathRevalidator for RecordingRevalidator {
    fn revalidate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

fn profile(id: &str, username: &str, name: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        bio: "hi".to_string(),
        image: String::new(),
    }
}

#[tokio::test]
async fn update_user_upserts_and_lowercases_username() {
    let store = MemoryStore::new();
    let reval = RecordingRevalidator::default();

    let created = user::update_user(&store, &reval, profile("u1", "Alice_B", "Alice"), "/onboarding")
        .await
        .unwrap();
    assert_eq!(created.username, "alice_b");
    assert!(created.onboarded);
    assert!(reval.paths.lock().unwrap().is_empty());

    let updated = user::update_user(&store, &reval, profile("u1", "alice_b", "Alice B"), "/profile/edit")
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice B");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(*reval.paths.lock().unwrap(), vec!["/profile/edit".to_string()]);
}

#[tokio::test]
async fn update_user_rejects_taken_username() {
    let store = MemoryStore::new();
    let reval = RecordingRevalidator::default();
    user::update_user(&store, &reval, profile("u1", "alice", "Alice"), "/")
        .await
        .unwrap();

    let err = user::update_user(&store, &reval, profile("u2", "ALICE", "Impostor"), "/")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn fetch_unknown_user_is_not_found() {
    let store = MemoryStore::new();

    let err = user::fetch_user(&store, "ghost").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn fetch_user_posts_keeps_writing_order_and_expands_replies() {
    let store = MemoryStore::new();
    let reval = RecordingRevalidator::default();
    user::update_user(&store, &reval, profile("u1", "alice", "Alice"), "/").await.unwrap();
    user::update_user(&store, &reval, profile("u2", "bob", "Bob"), "/").await.unwrap();

    let first = post::create_post(&store, &reval, "first post".to_string(), "u1", None, "/")
        .await
        .unwrap();
    let second = post::create_post(&store, &reval, "second post".to_string(), "u1", None, "/")
        .await
        .unwrap();
    comment::append_comment(&store, &reval, &first.id, "nice one".to_string(), "u2", "/")
        .await
        .unwrap();

    let result = user::fetch_user_posts(&store, "u1").await.unwrap();

    let ids: Vec<&str> = result.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    let reply = result.posts[0].children[0].as_node().unwrap();
    assert_eq!(reply.author.as_ref().unwrap().username, "bob");
}

#[tokio::test]
async fn fetch_users_excludes_caller_and_filters_by_search() {
    let store = MemoryStore::new();
    let reval = RecordingRevalidator::default();
    for (id, username, name) in [
        ("u1", "alice", "Alice Liddell"),
        ("u2", "bob", "Bob Builder"),
        ("u3", "carol", "Carol Alison"),
    ] {
        user::update_user(&store, &reval, profile(id, username, name), "/").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let everyone = user::fetch_users(&store, "u1", None, 1, 20, None).await.unwrap();
    let ids: Vec<&str> = everyone.users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u3", "u2"]);
    assert!(!everyone.is_next);

    let oldest_first = user::fetch_users(&store, "u1", None, 1, 1, Some("asc")).await.unwrap();
    assert_eq!(oldest_first.users[0].id, "u2");
    assert!(oldest_first.is_next);

    let found = user::fetch_users(&store, "u2", Some("ALI".to_string()), 1, 20, None)
        .await
        .unwrap();
    let ids: Vec<&str> = found.users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u3", "u1"]);
}

#[tokio::test]
async fn fetch_users_rejects_page_beyond_offset_range() {
    let store = MemoryStore::new();

    let err = user::fetch_users(&store, "me", None, i64::MAX, 20, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}
