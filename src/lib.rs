use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ratelimit;
pub mod repository;
pub mod slug;

// Module for routing segregation (Public, Posts, Admin UI).
pub mod routes;
use routes::{admin, posts, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the entry point and tests.
pub use config::AppConfig;
pub use error::ApiError;
pub use ratelimit::RateLimiter;
pub use repository::{
    PostRepositoryState, PostgresPostRepository, PostgresUserRepository, UserRepositoryState,
};

/// ApiDoc
///
/// Auto-generated OpenAPI documentation aggregating every handler and
/// schema decorated with the `utoipa` macros. Served as JSON at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::get_posts, handlers::get_post,
        handlers::create_post, handlers::update_post, handlers::delete_post
    ),
    components(
        schemas(
            models::Post, models::PostSummary, models::Role,
            models::LoginRequest, models::LoginResponse, models::PublicUser,
            models::CreatePostRequest, models::UpdatePostRequest,
            models::PostListResponse, models::PostResponse,
        )
    ),
    tags(
        (name = "quillpress", description = "Single-author blog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, cloned into every request. The rate limiter lives here,
/// constructor-injected rather than a process global, so tests own and
/// reset their instance, and a distributed backend can replace it without
/// touching call sites.
#[derive(Clone)]
pub struct AppState {
    /// Post persistence behind the repository contract.
    pub repo: PostRepositoryState,
    /// User lookup for the login flow.
    pub users: UserRepositoryState,
    /// Fixed-window rate limiting for login and post creation.
    pub limiter: Arc<RateLimiter>,
    /// Immutable environment configuration, including the token secret.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors and middleware pull individual components from AppState.

impl FromRef<AppState> for PostRepositoryState {
    fn from_ref(app_state: &AppState) -> PostRepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for UserRepositoryState {
    fn from_ref(app_state: &AppState) -> UserRepositoryState {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for Arc<RateLimiter> {
    fn from_ref(app_state: &AppState) -> Arc<RateLimiter> {
        app_state.limiter.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies global middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: health and login.
        .merge(public::public_routes())
        // The posts resource: anonymous reads, handler-gated mutations.
        .merge(posts::post_routes())
        // Admin UI shell: cookie-gated, redirecting to /admin/login.
        .nest("/admin", admin::admin_routes(state.clone()))
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Generate a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Wrap the request/response lifecycle in a tracing span
                // carrying the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the generated x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: includes the `x-request-id` header in
/// the structured metadata so every log line of a request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
