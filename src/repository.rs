use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Post, PostSummary, Role, User},
};

/// PostRepository Trait
///
/// Abstract contract for post persistence. Handlers only see this trait,
/// so tests can drop in an in-memory implementation and the storage engine
/// can change without touching the mutation flow.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn
/// PostRepository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Single-record lookup by its unique slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, ApiError>;

    /// All posts as listing summaries, newest first.
    async fn find_all(&self) -> Result<Vec<PostSummary>, ApiError>;

    /// Every slug currently in use. The slug generator probes this set.
    async fn list_all_slugs(&self) -> Result<Vec<String>, ApiError>;

    /// Persists a new post; timestamps are set by the store.
    async fn create(&self, title: &str, content: &str, slug: &str) -> Result<Post, ApiError>;

    /// Rewrites title/content/slug of the post currently at `slug`, bumping
    /// `updated_at`. Returns `None` when no post exists at `slug`.
    async fn update(
        &self,
        slug: &str,
        title: &str,
        content: &str,
        new_slug: &str,
    ) -> Result<Option<Post>, ApiError>;

    /// Hard delete. Returns `true` when a row was removed.
    async fn delete(&self, slug: &str) -> Result<bool, ApiError>;
}

/// UserRepository Trait
///
/// The single read operation the auth pipeline needs. Users are
/// provisioned out-of-band and never written by this service.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
}

pub type PostRepositoryState = Arc<dyn PostRepository>;
pub type UserRepositoryState = Arc<dyn UserRepository>;

/// PostgresPostRepository
///
/// Concrete `PostRepository` backed by PostgreSQL. The `posts.slug` column
/// carries a unique constraint as a second line of defense; uniqueness is
/// primarily enforced by generation-time probing in the mutation flow.
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, title, content, slug, created_at, updated_at";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, ApiError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn find_all(&self) -> Result<Vec<PostSummary>, ApiError> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, slug, created_at, updated_at FROM posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn list_all_slugs(&self) -> Result<Vec<String>, ApiError> {
        let slugs = sqlx::query_scalar::<_, String>("SELECT slug FROM posts")
            .fetch_all(&self.pool)
            .await?;
        Ok(slugs)
    }

    async fn create(&self, title: &str, content: &str, slug: &str) -> Result<Post, ApiError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, content, slug, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    async fn update(
        &self,
        slug: &str,
        title: &str,
        content: &str,
        new_slug: &str,
    ) -> Result<Option<Post>, ApiError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET title = $2, content = $3, slug = $4, updated_at = NOW() \
             WHERE slug = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(slug)
        .bind(title)
        .bind(content)
        .bind(new_slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn delete(&self, slug: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Raw row shape for users; the role column is TEXT and converted to the
/// `Role` enum explicitly so a mangled value fails loudly instead of
/// defaulting to some permission level.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = ApiError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| ApiError::Persistence(format!("unknown role value: {}", row.role)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

/// PostgresUserRepository
///
/// Concrete `UserRepository` backed by PostgreSQL.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
