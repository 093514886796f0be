// tests/api_tests.rs

use std::sync::Arc;

use phorst::{
    config::{Config, StoreKind},
    routes,
    state::AppState,
    store::MemoryStore,
    utils::{jwt::sign_jwt, revalidate::TracingRevalidator},
};

const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. Create test configuration and state
    let config = Config {
        store: StoreKind::Memory,
        database_url: None,
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        request_timeout_secs: 10,
        cors_origins: vec!["http://localhost:3000".to_string()],
    };

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        revalidator: Arc::new(TracingRevalidator),
        config,
    };

    // 2. Create the router with the app state
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn bearer(user_id: &str) -> String {
    format!("Bearer {}", sign_jwt(user_id, JWT_SECRET, 600).unwrap())
}

/// Creates a user profile for a fresh identity and returns (id, auth header).
async fn onboard(client: &reqwest::Client, address: &str) -> (String, String) {
    let id = format!("user_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let auth = bearer(&id);

    let response = client
        .put(format!("{}/api/users/me", address))
        .header("Authorization", &auth)
        .json(&serde_json::json!({
            "username": id,
            "name": "Test User",
            "bio": "",
            "image": "https://example.com/a.png",
            "path": "/onboarding"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    (id, auth)
}

async fn create_post(client: &reqwest::Client, address: &str, auth: &str, text: &str) -> String {
    let response = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", auth)
        .json(&serde_json::json!({ "text": text, "path": "/" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn create_comment(
    client: &reqwest::Client,
    address: &str,
    auth: &str,
    parent: &str,
    text: &str,
) -> String {
    let response = client
        .post(format!("{}/api/posts/{}/comments", address, parent))
        .header("Authorization", auth)
        .json(&serde_json::json!({ "text": text, "path": format!("/phorst/{}", parent) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn write_routes_require_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/posts", address))
        .json(&serde_json::json!({ "text": "hello world" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", "Bearer not-a-token")
        .json(&serde_json::json!({ "text": "hello world" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn short_post_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, auth) = onboard(&client, &address).await;

    let response = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", &auth)
        .json(&serde_json::json!({ "text": "yo" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn comment_thread_and_cascade_delete_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (author_id, author) = onboard(&client, &address).await;
    let (_, other) = onboard(&client, &address).await;

    let root = create_post(&client, &address, &author, "root post").await;
    let c1 = create_comment(&client, &address, &other, &root, "first comment").await;
    let c2 = create_comment(&client, &address, &author, &c1, "nested comment").await;

    // Detail view expands replies and their replies.
    let detail: serde_json::Value = client
        .get(format!("{}/api/posts/{}", address, root))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["author"]["id"], author_id.as_str());
    assert_eq!(detail["children"][0]["id"], c1.as_str());
    assert_eq!(detail["children"][0]["children"][0]["id"], c2.as_str());

    // Only the author may delete.
    let forbidden = client
        .delete(format!("{}/api/posts/{}", address, c1))
        .header("Authorization", &author)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let deleted = client
        .delete(format!("{}/api/posts/{}?path=/phorst/{}", address, c1, root))
        .header("Authorization", &other)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    // Root survives without the deleted branch.
    let detail: serde_json::Value = client
        .get(format!("{}/api/posts/{}", address, root))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["children"].as_array().unwrap().len(), 0);

    for gone in [&c1, &c2] {
        let response = client
            .get(format!("{}/api/posts/{}", address, gone))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    // Deleting again is NotFound.
    let again = client
        .delete(format!("{}/api/posts/{}", address, c1))
        .header("Authorization", &other)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 404);
}

#[tokio::test]
async fn comment_on_missing_post_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, auth) = onboard(&client, &address).await;

    let response = client
        .post(format!("{}/api/posts/does-not-exist/comments", address))
        .header("Authorization", &auth)
        .json(&serde_json::json!({ "text": "hello?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn feed_and_profile_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (author_id, auth) = onboard(&client, &address).await;

    let first = create_post(&client, &address, &auth, "first post").await;
    let second = create_post(&client, &address, &auth, "second post").await;
    create_comment(&client, &address, &auth, &first, "a comment").await;

    let feed: serde_json::Value = client
        .get(format!("{}/api/posts?page=1&page_size=1", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed["posts"].as_array().unwrap().len(), 1);
    assert_eq!(feed["is_next"], true);

    let bad_page = client
        .get(format!("{}/api/posts?page=0", address))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_page.status().as_u16(), 400);

    let huge_page = client
        .get(format!("{}/api/posts?page={}", address, i64::MAX))
        .send()
        .await
        .unwrap();
    assert_eq!(huge_page.status().as_u16(), 400);

    let profile: serde_json::Value = client
        .get(format!("{}/api/users/{}/posts", address, author_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["user"]["id"], author_id.as_str());
    assert_eq!(profile["user"]["onboarded"], true);
    let ids: Vec<&str> = profile["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    assert_eq!(profile["posts"][0]["children"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn community_post_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, auth) = onboard(&client, &address).await;
    let community_id = format!("org_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);

    let invalid = client
        .put(format!("{}/api/communities/{}", address, community_id))
        .header("Authorization", &auth)
        .json(&serde_json::json!({ "username": "not a handle!", "name": "Builders" }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);

    let created = client
        .put(format!("{}/api/communities/{}", address, community_id))
        .header("Authorization", &auth)
        .json(&serde_json::json!({ "username": community_id, "name": "Builders" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", &auth)
        .json(&serde_json::json!({ "text": "inside a community", "community_id": community_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let post_id = response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let community: serde_json::Value = client
        .get(format!("{}/api/communities/{}", address, community_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(community["posts"][0], post_id.as_str());

    let deleted = client
        .delete(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let community: serde_json::Value = client
        .get(format!("{}/api/communities/{}", address, community_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(community["posts"].as_array().unwrap().len(), 0);
}
