//! Shared test harness: in-memory repository implementations and state
//! assembly. Handlers depend on the repository traits, so the suite runs
//! without a database.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use quillpress::{
    AppConfig, AppState, RateLimiter,
    auth::{self, AuthUser},
    error::ApiError,
    models::{Post, PostSummary, Role, User},
    repository::{PostRepository, UserRepository},
};
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "local-development-secret-do-not-deploy";

// --- In-memory post repository ---

/// Records every mutation call so tests can assert that a rejected request
/// never reached persistence.
#[derive(Default)]
pub struct MemoryPostRepo {
    pub posts: RwLock<Vec<Post>>,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MemoryPostRepo {
    pub fn seeded(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
            ..Self::default()
        }
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepo {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, ApiError> {
        Ok(self
            .posts
            .read()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<PostSummary>, ApiError> {
        let mut posts = self.posts.read().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts
            .into_iter()
            .map(|p| PostSummary {
                id: p.id,
                title: p.title,
                slug: p.slug,
                created_at: p.created_at,
                updated_at: p.updated_at,
            })
            .collect())
    }

    async fn list_all_slugs(&self) -> Result<Vec<String>, ApiError> {
        Ok(self
            .posts
            .read()
            .unwrap()
            .iter()
            .map(|p| p.slug.clone())
            .collect())
    }

    async fn create(&self, title: &str, content: &str, slug: &str) -> Result<Post, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.posts.write().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        slug: &str,
        title: &str,
        content: &str,
        new_slug: &str,
    ) -> Result<Option<Post>, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut posts = self.posts.write().unwrap();
        match posts.iter_mut().find(|p| p.slug == slug) {
            Some(post) => {
                post.title = title.to_string();
                post.content = content.to_string();
                post.slug = new_slug.to_string();
                post.updated_at = Utc::now();
                Ok(Some(post.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, slug: &str) -> Result<bool, ApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut posts = self.posts.write().unwrap();
        let before = posts.len();
        posts.retain(|p| p.slug != slug);
        Ok(posts.len() < before)
    }
}

/// Post repository that fails every call, for the 500 path.
pub struct FailingPostRepo;

#[async_trait]
impl PostRepository for FailingPostRepo {
    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Post>, ApiError> {
        Err(ApiError::Persistence("simulated outage".to_string()))
    }
    async fn find_all(&self) -> Result<Vec<PostSummary>, ApiError> {
        Err(ApiError::Persistence("simulated outage".to_string()))
    }
    async fn list_all_slugs(&self) -> Result<Vec<String>, ApiError> {
        Err(ApiError::Persistence("simulated outage".to_string()))
    }
    async fn create(&self, _: &str, _: &str, _: &str) -> Result<Post, ApiError> {
        Err(ApiError::Persistence("simulated outage".to_string()))
    }
    async fn update(&self, _: &str, _: &str, _: &str, _: &str) -> Result<Option<Post>, ApiError> {
        Err(ApiError::Persistence("simulated outage".to_string()))
    }
    async fn delete(&self, _slug: &str) -> Result<bool, ApiError> {
        Err(ApiError::Persistence("simulated outage".to_string()))
    }
}

// --- In-memory user repository ---

#[derive(Default)]
pub struct MemoryUserRepo {
    pub users: Vec<User>,
}

impl MemoryUserRepo {
    /// A single admin account with the given credentials.
    pub fn with_admin(username: &str, password: &str) -> Self {
        Self {
            users: vec![User {
                id: Uuid::from_u128(1),
                username: username.to_string(),
                password_hash: auth::hash_password(password).unwrap(),
                role: Role::Admin,
            }],
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }
}

// --- State assembly ---

pub fn test_state(repo: Arc<MemoryPostRepo>, users: MemoryUserRepo) -> AppState {
    AppState {
        repo,
        users: Arc::new(users),
        limiter: Arc::new(RateLimiter::new()),
        config: AppConfig::default(),
    }
}

// --- Fixtures ---

pub fn admin_user() -> AuthUser {
    AuthUser {
        id: Uuid::from_u128(1),
        username: "casey".to_string(),
        role: Role::Admin,
    }
}

pub fn editor_user() -> AuthUser {
    AuthUser {
        id: Uuid::from_u128(2),
        username: "riley".to_string(),
        role: Role::Editor,
    }
}

pub fn admin_token() -> String {
    auth::create_token(&admin_user(), TEST_SECRET).unwrap()
}

pub fn editor_token() -> String {
    auth::create_token(&editor_user(), TEST_SECRET).unwrap()
}

/// A seeded post; `age_minutes` pushes `created_at` into the past so
/// listing order is deterministic.
pub fn seed_post(title: &str, slug: &str, age_minutes: i64) -> Post {
    let at = Utc::now() - Duration::minutes(age_minutes);
    Post {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: format!("<p>{}</p>", title),
        slug: slug.to_string(),
        created_at: at,
        updated_at: at,
    }
}
