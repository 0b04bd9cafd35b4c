use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness banner at the root path.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "API is up"))
)]
pub async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Blog API running successfully!" }))
}
