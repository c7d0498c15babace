use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

/// Maximum length of a post title, in characters.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum length of post content (rich HTML), in characters.
pub const CONTENT_MAX_CHARS: usize = 50_000;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The two permission levels known to the platform. All content mutation
/// requires `Admin`; `Editor` exists as the non-elevated level. Serialized
/// uppercase (`"ADMIN"` / `"EDITOR"`) on the wire, in token claims, and in
/// the database, so there is exactly one casing in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Editor => "EDITOR",
        }
    }

    /// Parses the canonical uppercase form. Unknown values are rejected so
    /// a mangled database row cannot silently grant or revoke access.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "EDITOR" => Some(Role::Editor),
            _ => None,
        }
    }
}

/// User
///
/// Canonical identity record. Users are provisioned out-of-band (seed
/// script or operator SQL); this service only ever reads them. The stored
/// credential is an Argon2id hash, never a plaintext password, and is
/// excluded from serialization so it cannot leak through a response body.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct User {
    pub id: Uuid,
    // Unique, stored trimmed.
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// Post
///
/// A published article. The slug is derived from the title at creation
/// time, globally unique across all posts, and may be regenerated when an
/// update changes the title.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    // Rich HTML produced by the (external) editor UI.
    pub content: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PostSummary
///
/// Listing projection: everything but the content body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credentials posted to `/auth/login`. Fields default to empty so a
/// missing field surfaces as a 400 validation error rather than a body
/// deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// CreatePostRequest
///
/// Input payload for POST /posts. The slug is never client-supplied; it is
/// always derived server-side from the title.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// UpdatePostRequest
///
/// Input payload for PUT /posts/{slug}. Both fields are required; partial
/// updates are not part of the contract (last write wins on the full pair).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

// --- Response Envelopes (Output Schemas) ---

/// PublicUser
///
/// Identity fields returned by the login endpoint. Deliberately excludes
/// anything credential-adjacent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostResponse {
    pub success: bool,
    pub post: Post,
}

// --- Validation ---

/// validate_post_input
///
/// Shape and length checks shared by the create and update flows. Collects
/// every violation rather than stopping at the first, so the caller gets a
/// complete picture in one round trip. Runs before any repository call.
pub fn validate_post_input(title: &str, content: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("Title cannot be empty".to_string());
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.push(format!("Title must be at most {} characters", TITLE_MAX_CHARS));
    }

    if content.trim().is_empty() {
        errors.push("Content cannot be empty".to_string());
    } else if content.chars().count() > CONTENT_MAX_CHARS {
        errors.push(format!(
            "Content must be at most {} characters",
            CONTENT_MAX_CHARS
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}
