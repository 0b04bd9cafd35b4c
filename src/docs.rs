// src/docs.rs

use axum::{Json, response::IntoResponse};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{auth, comments, health, interaction, posts, profile},
    models::{
        comment::{Comment, CommentCount, CommentRequest, CommentResponse},
        interaction::{LikeCount, LikeStatus, SaveStatus, SavedPost},
        post::{Post, PostRequest, PostView},
        user::{AuthUser, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, UpdateBioRequest, User},
    },
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Blog API", description = "Posts, comments, likes and bookmarks."),
    paths(
        health::index,
        auth::register,
        auth::login,
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        posts::update_post,
        posts::delete_post,
        posts::search_posts,
        interaction::like_post,
        interaction::unlike_post,
        interaction::get_post_likes,
        interaction::save_post,
        interaction::unsave_post,
        interaction::list_saved_posts,
        profile::get_profile,
        profile::update_bio,
        comments::list_comments,
        comments::add_comment,
        comments::edit_comment,
        comments::delete_comment,
        comments::count_comments,
    ),
    components(schemas(
        User, AuthUser, LoginResponse, ProfileResponse, RegisterRequest, LoginRequest, UpdateBioRequest,
        Post, PostView, PostRequest,
        Comment, CommentResponse, CommentRequest, CommentCount,
        LikeStatus, LikeCount, SaveStatus, SavedPost,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/posts",
            "/api/posts/{id}",
            "/api/posts/search",
            "/api/posts/saved",
            "/api/posts/profile/bio",
            "/api/comments/count/{post_id}",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }

        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
