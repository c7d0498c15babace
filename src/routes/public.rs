use crate::{AppState, handlers};
use axum::{Router, routing::{get, post}};

/// Public Router Module
///
/// Endpoints reachable by any client without a credential.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/login
        // Credential exchange. Deliberately outside any auth gate so a
        // client can never be locked out of the login path itself; abuse
        // is bounded by the login rate-limit window instead.
        .route("/auth/login", post(handlers::login))
}
