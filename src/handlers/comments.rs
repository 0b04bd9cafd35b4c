use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    error::{AppError, is_foreign_key_violation},
    models::comment::{Comment, CommentCount, CommentRequest, CommentResponse},
    utils::{extract::ValidatedJson, jwt::Claims},
};

/// Locks a comment row for the rest of the transaction and checks the caller wrote it.
async fn lock_own_comment(
    tx: &mut Transaction<'_, Postgres>,
    comment_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    let owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM comments WHERE id = $1 FOR UPDATE")
        .bind(comment_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if owner != user_id {
        return Err(AppError::Forbidden(
            "You can only change your own comments".to_string(),
        ));
    }

    Ok(())
}

/// Create a new comment on a post.
#[utoipa::path(
    post,
    path = "/api/comments/{post_id}",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = CommentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 404, description = "No such post")
    )
)]
pub async fn add_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (content, user_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id, content, user_id, post_id, created_at, updated_at
        "#,
    )
    .bind(&payload.content)
    .bind(claims.id)
    .bind(post_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Post not found".to_string())
        } else {
            tracing::error!("Failed to add comment: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List all comments for a post, newest first.
#[utoipa::path(
    get,
    path = "/api/comments/{post_id}",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id")),
    responses((status = 200, description = "Comments with author names", body = Vec<CommentResponse>))
)]
pub async fn list_comments(
    State(pool): State<PgPool>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comments = sqlx::query_as::<_, CommentResponse>(
        r#"
        SELECT
            c.id, c.content, c.user_id, c.post_id, u.username,
            c.created_at, c.updated_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.post_id = $1
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list comments: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(comments))
}

/// Edit a comment. Only its author may do so.
#[utoipa::path(
    put,
    path = "/api/comments/{comment_id}",
    tag = "comments",
    params(("comment_id" = i64, Path, description = "Comment id")),
    request_body = CommentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated comment", body = Comment),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such comment")
    )
)]
pub async fn edit_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    lock_own_comment(&mut tx, comment_id, claims.id).await?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING id, content, user_id, post_id, created_at, updated_at
        "#,
    )
    .bind(&payload.content)
    .bind(comment_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(comment))
}

/// Delete a comment. Only its author may do so.
#[utoipa::path(
    delete,
    path = "/api/comments/{comment_id}",
    tag = "comments",
    params(("comment_id" = i64, Path, description = "Comment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such comment")
    )
)]
pub async fn delete_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    lock_own_comment(&mut tx, comment_id, claims.id).await?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(comment_id, user_id = claims.id, "comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Number of comments on a post.
#[utoipa::path(
    get,
    path = "/api/comments/count/{post_id}",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id")),
    responses((status = 200, description = "Comment count", body = CommentCount))
)]
pub async fn count_comments(
    State(pool): State<PgPool>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(&pool)
        .await?;

    Ok(Json(CommentCount { count }))
}
