use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, is_foreign_key_violation},
    models::post::{Post, PostListParams, PostRequest, PostView, SearchParams, escape_like},
    utils::{
        extract::ValidatedJson,
        jwt::{Claims, Viewer},
    },
};

/// Starts the post listing query shared by list, get and search.
///
/// Every post is joined with its author's username and left-joined with its
/// likes; `is_liked` is the boolean-or of "this like belongs to the viewer".
/// Callers append their WHERE clause and must finish with `finish_post_view`.
fn post_view_query<'a>(viewer_id: i64) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT
            p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
            u.username AS author,
            COUNT(pl.post_id) AS likes,
            COALESCE(BOOL_OR(pl.user_id = "#,
    );
    builder.push_bind(viewer_id);
    builder.push(
        r#"), FALSE) AS is_liked
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes pl ON pl.post_id = p.id
        "#,
    );
    builder
}

fn finish_post_view(builder: &mut QueryBuilder<'_, Postgres>) {
    builder.push(" GROUP BY p.id, u.username ORDER BY p.id DESC");
}

/// Fetches one post as seen by `viewer_id`.
pub(crate) async fn fetch_post_view(
    pool: &PgPool,
    id: i64,
    viewer_id: i64,
) -> Result<Option<PostView>, AppError> {
    let mut builder = post_view_query(viewer_id);
    builder.push(" WHERE p.id = ").push_bind(id);
    finish_post_view(&mut builder);

    Ok(builder
        .build_query_as::<PostView>()
        .fetch_optional(pool)
        .await?)
}

/// Create a new post authored by the caller.
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = PostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, content, author_id)
        VALUES ($1, $2, $3)
        RETURNING id, title, content, author_id, created_at, updated_at
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(claims.id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            // Token outlived its user.
            AppError::AuthError("User no longer exists".to_string())
        } else {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(post_id = post.id, author_id = claims.id, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// List posts, newest first, optionally restricted to one author.
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PostListParams),
    responses((status = 200, description = "Posts with like info", body = Vec<PostView>))
)]
pub async fn list_posts(
    State(pool): State<PgPool>,
    viewer: Viewer,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut builder = post_view_query(viewer.id_or(params.user_id));
    if let Some(author_id) = params.author_id {
        builder.push(" WHERE p.author_id = ").push_bind(author_id);
    }
    finish_post_view(&mut builder);

    let posts = builder
        .build_query_as::<PostView>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::from(e)
        })?;

    tracing::debug!(count = posts.len(), author_id = ?params.author_id, "listed posts");

    Ok(Json(posts))
}

/// Get a single post by ID.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostView),
        (status = 404, description = "No such post")
    )
)]
pub async fn get_post(
    State(pool): State<PgPool>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = fetch_post_view(&pool, id, viewer.id_or(None))
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Loads the author of a post, failing with 404/403 unless it is the caller.
async fn ensure_author(pool: &PgPool, post_id: i64, user_id: i64) -> Result<(), AppError> {
    let author_id = sqlx::query_scalar::<_, i64>("SELECT author_id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if author_id != user_id {
        return Err(AppError::Forbidden(
            "You are not the author of this post".to_string(),
        ));
    }

    Ok(())
}

/// Replace a post's title and content.
/// Requires: Login + Author.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    request_body = PostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn update_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_author(&pool, id, claims.id).await?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $1, content = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING id, title, content, author_id, created_at, updated_at
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update post: {:?}", e);
        AppError::from(e)
    })?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Delete a post together with its comments, likes and saves.
/// Requires: Login + Author.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_author(&pool, id, claims.id).await?;

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(post_id = id, "post deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Case-insensitive substring search over titles and contents.
/// A blank query returns an empty list without touching the database.
#[utoipa::path(
    get,
    path = "/api/posts/search",
    tag = "posts",
    params(SearchParams),
    responses((status = 200, description = "Matching posts", body = Vec<PostView>))
)]
pub async fn search_posts(
    State(pool): State<PgPool>,
    viewer: Viewer,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let Some(term) = params.term() else {
        return Ok(Json(Vec::<PostView>::new()));
    };

    let pattern = format!("%{}%", escape_like(term));

    let mut builder = post_view_query(viewer.id_or(params.user_id));
    builder
        .push(" WHERE p.title ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR p.content ILIKE ")
        .push_bind(pattern);
    finish_post_view(&mut builder);

    let posts = builder
        .build_query_as::<PostView>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search posts: {:?}", e);
            AppError::from(e)
        })?;

    tracing::debug!(term, results = posts.len(), "searched posts");

    Ok(Json(posts))
}
