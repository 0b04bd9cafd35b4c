// src/models/interaction.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Like state of a post after a like/unlike, from the acting user's side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeStatus {
    pub post_id: i64,
    pub likes: i64,
    pub is_liked: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeCount {
    pub likes: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveStatus {
    pub post_id: i64,
    pub saved: bool,
}

/// A bookmarked post, joined with its author.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SavedPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the current user saved it.
    pub saved_at: chrono::DateTime<chrono::Utc>,
}
