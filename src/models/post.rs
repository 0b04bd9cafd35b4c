use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Set on the first edit.
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A post as listed to a viewer: joined author name, like count and
/// whether the viewer has liked it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Author's username.
    pub author: String,

    pub likes: i64,

    /// UI helper: whether the viewer has liked this post.
    pub is_liked: bool,
}

/// DTO for creating or replacing a post.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title length must be between 1 and 200 chars"
        ),
        custom(function = "crate::utils::text::not_blank")
    )]
    pub title: String,

    #[validate(
        length(
            min = 1,
            max = 20000,
            message = "Content length must be between 1 and 20000 chars"
        ),
        custom(function = "crate::utils::text::not_blank")
    )]
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListParams {
    /// Only posts written by this user.
    pub author_id: Option<i64>,

    /// Viewer used for `is_liked` when no bearer token is sent.
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

/// Query parameters for searching posts.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring matched against title and content.
    pub q: Option<String>,

    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

impl SearchParams {
    /// The trimmed search term, or `None` when there is nothing to search for.
    pub fn term(&self) -> Option<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// Escapes `%`, `_` and `\` so user input is matched literally by LIKE/ILIKE.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("snake_case"), r"snake\_case");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn blank_search_has_no_term() {
        let params = SearchParams {
            q: Some("   ".into()),
            user_id: None,
        };
        assert_eq!(params.term(), None);
        assert_eq!(SearchParams::default().term(), None);

        let params = SearchParams {
            q: Some(" rust ".into()),
            user_id: None,
        };
        assert_eq!(params.term(), Some("rust"));
    }

    #[test]
    fn empty_title_is_invalid() {
        let payload = PostRequest {
            title: String::new(),
            content: "body".into(),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn whitespace_title_is_invalid_but_markup_is_kept() {
        let blank = PostRequest {
            title: "   ".into(),
            content: "body".into(),
        };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let markup = PostRequest {
            title: "<script>x</script>".into(),
            content: "Tom & Jerry a<b".into(),
        };
        assert!(markup.validate().is_ok());
    }

    #[test]
    fn title_limit_counts_characters_as_sent() {
        let ampersands = PostRequest {
            title: "&".repeat(200),
            content: "body".into(),
        };
        assert!(ampersands.validate().is_ok());

        let too_long = PostRequest {
            title: "&".repeat(201),
            content: "body".into(),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn list_params_read_camel_case_viewer() {
        let params: PostListParams =
            serde_json::from_value(serde_json::json!({"author_id": 3, "userId": 9})).unwrap();
        assert_eq!(params.author_id, Some(3));
        assert_eq!(params.user_id, Some(9));
    }
}
