// src/routes.rs

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{community, post as posts, user},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (posts, users, communities).
/// * Applies global middleware (Trace, CORS, request timeout).
/// * Injects global state (store handle, revalidator, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{id}", get(posts::get_post))
        // Protected post routes
        .merge(
            Router::new()
                .route("/", post(posts::create_post))
                .route("/{id}", axum::routing::delete(posts::delete_post))
                .route("/{id}/comments", post(posts::create_comment))
                .layer(auth.clone()),
        );

    let user_routes = Router::new()
        .route("/{id}", get(user::get_user))
        .route("/{id}/posts", get(user::list_user_posts))
        .merge(
            Router::new()
                .route("/", get(user::search_users))
                .route("/me", put(user::update_me))
                .layer(auth.clone()),
        );

    let community_routes = Router::new()
        .route("/{id}", get(community::get_community))
        .merge(
            Router::new()
                .route("/{id}", put(community::upsert_community))
                .layer(auth),
        );

    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .nest("/api/posts", post_routes)
        .nest("/api/users", user_routes)
        .nest("/api/communities", community_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}
