use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::{AppError, is_foreign_key_violation},
    models::interaction::{LikeCount, LikeStatus, SaveStatus, SavedPost},
    utils::jwt::Claims,
};

async fn count_likes(pool: &PgPool, post_id: i64) -> Result<i64, AppError> {
    let likes = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    Ok(likes)
}

/// Like a post. Liking twice is a no-op thanks to the (post, user) key.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "interactions",
    params(("id" = i64, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Post is liked", body = LikeStatus),
        (status = 404, description = "No such post")
    )
)]
pub async fn like_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO post_likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(claims.id)
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Post not found".to_string())
        } else {
            tracing::error!("Failed to like post: {:?}", e);
            AppError::from(e)
        }
    })?
    .rows_affected();

    tracing::debug!(post_id, user_id = claims.id, new = inserted > 0, "like");

    Ok(Json(LikeStatus {
        post_id,
        likes: count_likes(&pool, post_id).await?,
        is_liked: true,
    }))
}

/// Remove the caller's like. Unliking a post that was never liked is a no-op.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}/unlike",
    tag = "interactions",
    params(("id" = i64, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Post is not liked", body = LikeStatus))
)]
pub async fn unlike_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(claims.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to unlike post: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(LikeStatus {
        post_id,
        likes: count_likes(&pool, post_id).await?,
        is_liked: false,
    }))
}

/// Number of likes on a post.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/likes",
    tag = "interactions",
    params(("id" = i64, Path, description = "Post id")),
    responses((status = 200, description = "Like count", body = LikeCount))
)]
pub async fn get_post_likes(
    State(pool): State<PgPool>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let likes = count_likes(&pool, post_id).await?;
    Ok(Json(LikeCount { likes }))
}

/// Bookmark a post. Saving twice keeps a single bookmark.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/save",
    tag = "interactions",
    params(("id" = i64, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Post is saved", body = SaveStatus),
        (status = 404, description = "No such post")
    )
)]
pub async fn save_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query(
        r#"
        INSERT INTO saved_posts (user_id, post_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, post_id) DO NOTHING
        "#,
    )
    .bind(claims.id)
    .bind(post_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Post not found".to_string())
        } else {
            tracing::error!("Failed to save post: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(Json(SaveStatus {
        post_id,
        saved: true,
    }))
}

/// Remove a bookmark. Missing bookmarks are ignored.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}/save",
    tag = "interactions",
    params(("id" = i64, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Post is not saved", body = SaveStatus))
)]
pub async fn unsave_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM saved_posts WHERE user_id = $1 AND post_id = $2")
        .bind(claims.id)
        .bind(post_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to unsave post: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(SaveStatus {
        post_id,
        saved: false,
    }))
}

/// List posts saved by the current user, most recently saved first.
#[utoipa::path(
    get,
    path = "/api/posts/saved",
    tag = "interactions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Saved posts", body = Vec<SavedPost>))
)]
pub async fn list_saved_posts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let saved = sqlx::query_as::<_, SavedPost>(
        r#"
        SELECT
            p.id, p.title, p.content, p.author_id,
            u.username AS author,
            p.created_at,
            s.created_at AS saved_at
        FROM saved_posts s
        JOIN posts p ON s.post_id = p.id
        JOIN users u ON p.author_id = u.id
        WHERE s.user_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(claims.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list saved posts: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(saved))
}
