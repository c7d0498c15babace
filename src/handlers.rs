use crate::{
    AppState,
    auth::{self, AUTH_COOKIE, AuthUser, TOKEN_TTL_SECS},
    config::Env,
    error::ApiError,
    models::{
        CreatePostRequest, LoginRequest, LoginResponse, PostListResponse, PostResponse,
        PublicUser, Role, UpdatePostRequest, validate_post_input,
    },
    slug::generate_unique_slug,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::time::Duration;

// --- Rate limit policy ---

/// Login: 5 attempts per 5 minutes per client.
const LOGIN_MAX_REQUESTS: u32 = 5;
const LOGIN_WINDOW: Duration = Duration::from_millis(300_000);

/// Post creation: 10 posts per 10 minutes per client. Update and delete
/// are not rate-limited; the asymmetry is part of the documented contract.
const CREATE_MAX_REQUESTS: u32 = 10;
const CREATE_WINDOW: Duration = Duration::from_millis(600_000);

/// Client identity for rate limiting: the forwarded address set by the
/// reverse proxy, or a shared bucket when no proxy header is present.
fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
}

// --- Auth ---

/// login
///
/// [Public Route] Exchanges credentials for a session token. The flow is
/// rate limit → field presence → credential check → token issuance. Bad
/// username and bad password produce the same 401 body. On success the
/// token is returned as an HTTP-only, same-site-strict cookie alongside
/// the JSON identity payload.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let key = format!("login:{}", client_ip(&headers));
    if !state.limiter.check(&key, LOGIN_MAX_REQUESTS, LOGIN_WINDOW) {
        return Err(ApiError::RateLimited);
    }

    let mut missing = Vec::new();
    if payload.username.trim().is_empty() {
        missing.push("Username is required".to_string());
    }
    if payload.password.is_empty() {
        missing.push("Password is required".to_string());
    }
    if !missing.is_empty() {
        return Err(ApiError::Validation(missing));
    }

    let user = auth::authenticate(&state.users, &payload.username, &payload.password)
        .await?
        .ok_or(ApiError::Authentication)?;

    let token = auth::create_token(&user, &state.config.jwt_secret)?;

    let mut response = Json(LoginResponse {
        success: true,
        user: PublicUser {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        },
    })
    .into_response();

    let mut cookie = format!(
        "{AUTH_COOKIE}={token}; HttpOnly; SameSite=Strict; Max-Age={TOKEN_TTL_SECS}; Path=/"
    );
    if state.config.env == Env::Production {
        cookie.push_str("; Secure");
    }
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::Persistence(format!("cookie encoding failed: {e}")))?,
    );

    tracing::info!(username = %user.username, "login succeeded");
    Ok(response)
}

// --- Public content ---

/// get_posts
///
/// [Public Route] All posts as listing summaries, newest first.
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "Post listing", body = PostListResponse))
)]
pub async fn get_posts(State(state): State<AppState>) -> Result<Json<PostListResponse>, ApiError> {
    let posts = state.repo.find_all().await?;
    Ok(Json(PostListResponse {
        success: true,
        posts,
    }))
}

/// get_post
///
/// [Public Route] Full detail view of a single post, addressed by slug.
#[utoipa::path(
    get,
    path = "/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post found", body = PostResponse),
        (status = 404, description = "No post at this slug")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .repo
        .find_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

// --- Content mutation (ADMIN) ---

/// create_post
///
/// [Admin Route] Creates a post. The gate sequence is explicit because its
/// ordering is contractual: rate limiter first, then token verification
/// and role check, then validation, then slug assignment against the live
/// slug set, then the persistence write.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Created", body = PostResponse),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "No valid credential"),
        (status = 403, description = "Not an admin"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let key = format!("create-post:{}", client_ip(&headers));
    if !state.limiter.check(&key, CREATE_MAX_REQUESTS, CREATE_WINDOW) {
        return Err(ApiError::RateLimited);
    }

    let user = auth::authorize_admin(&headers, &state.config)?;

    validate_post_input(&payload.title, &payload.content)?;

    let existing = state.repo.list_all_slugs().await?;
    let slug = generate_unique_slug(&payload.title, &existing);
    if slug.is_empty() {
        return Err(ApiError::Validation(vec![
            "Title must contain at least one letter or digit".to_string(),
        ]));
    }

    let post = state
        .repo
        .create(payload.title.trim(), &payload.content, &slug)
        .await?;

    tracing::info!(slug = %post.slug, author = %user.username, "post created");
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// update_post
///
/// [Admin Route] Rewrites a post's title and content. When the trimmed
/// title changed, the slug is regenerated against every *other* post's
/// slug; the record being updated is excluded so an unchanged collision
/// with itself never forces a rename. A regenerated slug changes the
/// post's public URL; that is the documented default behavior.
#[utoipa::path(
    put,
    path = "/posts/{slug}",
    params(("slug" = String, Path, description = "Current post slug")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated; slug may differ", body = PostResponse),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "No valid credential"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No post at this slug")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    if user.role != Role::Admin {
        return Err(ApiError::Authorization);
    }

    validate_post_input(&payload.title, &payload.content)?;

    let existing = state
        .repo
        .find_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound)?;

    let new_slug = if payload.title.trim() != existing.title {
        let others: Vec<String> = state
            .repo
            .list_all_slugs()
            .await?
            .into_iter()
            .filter(|s| *s != existing.slug)
            .collect();
        let regenerated = generate_unique_slug(&payload.title, &others);
        if regenerated.is_empty() {
            return Err(ApiError::Validation(vec![
                "Title must contain at least one letter or digit".to_string(),
            ]));
        }
        regenerated
    } else {
        existing.slug.clone()
    };

    let post = state
        .repo
        .update(&slug, payload.title.trim(), &payload.content, &new_slug)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(old_slug = %slug, new_slug = %post.slug, "post updated");
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// delete_post
///
/// [Admin Route] Removes a post permanently. No soft delete, no recovery.
#[utoipa::path(
    delete,
    path = "/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "No valid credential"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No post at this slug")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    if user.role != Role::Admin {
        return Err(ApiError::Authorization);
    }

    if state.repo.delete(&slug).await? {
        tracing::info!(slug = %slug, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Admin UI shells ---
//
// The admin interface itself is rendered client-side; these handlers only
// anchor the gated routes. The page gate middleware in `routes::admin`
// redirects unauthenticated or non-admin visitors to the login entry
// point before any of these run.

pub async fn admin_login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}

pub async fn admin_dashboard() -> Html<&'static str> {
    Html("<!doctype html><title>Admin</title><h1>Dashboard</h1>")
}

pub async fn admin_posts_page() -> Html<&'static str> {
    Html("<!doctype html><title>Posts</title><h1>Posts</h1>")
}

pub async fn admin_post_create_page() -> Html<&'static str> {
    Html("<!doctype html><title>New post</title><h1>New post</h1>")
}

pub async fn admin_post_edit_page(Path(slug): Path<String>) -> Html<String> {
    Html(format!(
        "<!doctype html><title>Edit</title><h1>Editing {}</h1>",
        slug
    ))
}
