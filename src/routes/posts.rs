use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Posts Resource Router
///
/// Read and mutation methods share paths, so they live on one router.
/// GETs are anonymous; POST/PUT/DELETE require a verified ADMIN token,
/// enforced inside the handlers so that the create path can run its rate
/// limiter before the auth gate (the contractual ordering).
pub fn post_routes() -> Router<AppState> {
    Router::new()
        // GET  /posts         : public listing, newest first.
        // POST /posts         : admin-only, rate-limited creation.
        .route(
            "/posts",
            get(handlers::get_posts).post(handlers::create_post),
        )
        // GET    /posts/{slug}: public detail view.
        // PUT    /posts/{slug}: admin-only update; may change the slug.
        // DELETE /posts/{slug}: admin-only permanent removal.
        .route(
            "/posts/{slug}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
}
