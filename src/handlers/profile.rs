use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::user::{ProfileResponse, UpdateBioRequest},
    utils::{extract::ValidatedJson, jwt::Claims, text::blank_to_none},
};

async fn load_profile(pool: &PgPool, user_id: i64) -> Result<ProfileResponse, AppError> {
    sqlx::query_as::<_, ProfileResponse>(
        r#"
        SELECT
            u.id, u.username, u.email, u.bio, u.created_at,
            (SELECT COUNT(*) FROM posts WHERE author_id = u.id) AS posts_count,
            (SELECT COUNT(*) FROM post_likes pl JOIN posts p ON pl.post_id = p.id
              WHERE p.author_id = u.id) AS total_likes_received
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Get current user's profile and statistics.
#[utoipa::path(
    get,
    path = "/api/posts/profile",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile of the caller", body = ProfileResponse),
        (status = 404, description = "User was deleted")
    )
)]
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_profile(&pool, claims.id).await?))
}

/// Replace the caller's bio and return the refreshed profile.
#[utoipa::path(
    put,
    path = "/api/posts/profile/bio",
    tag = "profile",
    request_body = UpdateBioRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Bio too long")
    )
)]
pub async fn update_bio(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<UpdateBioRequest>,
) -> Result<impl IntoResponse, AppError> {
    let bio = blank_to_none(payload.bio);

    let updated = sqlx::query("UPDATE users SET bio = $1 WHERE id = $2")
        .bind(&bio)
        .bind(claims.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update bio: {:?}", e);
            AppError::from(e)
        })?
        .rows_affected();

    if updated == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = claims.id, cleared = bio.is_none(), "bio updated");

    Ok(Json(load_profile(&pool, claims.id).await?))
}
