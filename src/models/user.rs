// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Letters, digits and underscores only.
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is valid"));

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email, used to log in.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Free-text profile blurb.
    pub bio: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public identity returned alongside a login token.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// Always "Bearer".
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: AuthUser,
}

/// Profile data for the current user, with activity counters.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub posts_count: i64,
    pub total_likes_received: i64,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        length(
            min = 3,
            max = 50,
            message = "Username length must be between 3 and 50 characters."
        ),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores."
        )
    )]
    pub username: String,
    #[validate(
        email(message = "Email address is not valid."),
        length(max = 255, message = "Email must be at most 255 characters.")
    )]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBioRequest {
    /// New bio; `null` or blank clears it.
    #[validate(length(max = 500, message = "Bio must be at most 500 characters."))]
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(register("ada_99", "ada@example.com", "hunter22").validate().is_ok());
    }

    #[test]
    fn rejects_bad_username() {
        assert!(register("yo", "ada@example.com", "hunter22").validate().is_err());
        assert!(register("ada lovelace", "ada@example.com", "hunter22").validate().is_err());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let errors = register("ada", "not-an-email", "pw").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("username"));
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: 1,
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "$argon2id$secret".into(),
            bio: None,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn bio_length_is_capped() {
        let long = UpdateBioRequest {
            bio: Some("x".repeat(501)),
        };
        assert!(long.validate().is_err());
        assert!(UpdateBioRequest { bio: None }.validate().is_ok());
    }
}
