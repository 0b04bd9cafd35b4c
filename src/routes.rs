// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    docs,
    handlers::{auth, comments, health, interaction, posts, profile},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Builds the CORS policy from the configured origins, skipping any that are
/// not valid header values.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, posts, comments).
/// * Protected routes sit behind `auth_middleware`; public reads accept an optional token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Static segments ("search", "saved", "profile") win over "{id}".
    let public_post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/search", get(posts::search_posts))
        .route("/{id}", get(posts::get_post))
        .route("/{id}/likes", get(interaction::get_post_likes));

    let protected_post_routes = Router::new()
        .route("/", post(posts::create_post))
        .route("/{id}", put(posts::update_post).delete(posts::delete_post))
        .route("/{id}/like", post(interaction::like_post))
        .route("/{id}/unlike", delete(interaction::unlike_post))
        .route(
            "/{id}/save",
            post(interaction::save_post).delete(interaction::unsave_post),
        )
        .route("/saved", get(interaction::list_saved_posts))
        .route("/profile", get(profile::get_profile))
        .route("/profile/bio", put(profile::update_bio))
        .route_layer(require_auth.clone());

    let public_comment_routes = Router::new()
        .route("/{id}", get(comments::list_comments))
        .route("/count/{id}", get(comments::count_comments));

    let protected_comment_routes = Router::new()
        .route(
            "/{id}",
            post(comments::add_comment)
                .put(comments::edit_comment)
                .delete(comments::delete_comment),
        )
        .route_layer(require_auth);

    Router::new()
        .route("/", get(health::index))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .nest("/api/auth", auth_routes)
        .nest(
            "/api/posts",
            public_post_routes.merge(protected_post_routes),
        )
        .nest(
            "/api/comments",
            public_comment_routes.merge(protected_comment_routes),
        )
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_origins)),
        )
        .with_state(state)
}
