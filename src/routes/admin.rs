use crate::{AppState, auth, handlers, models::Role};
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

/// Admin UI Router Module
///
/// The browsable admin shell under `/admin`. The page gate shares token
/// verification with the API gate but differs in failure presentation:
/// instead of a structured 401/403 body, a failed check redirects the
/// browser to the login entry point. `/admin/login` itself sits outside
/// the gate so a signed-out admin can always reach it.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        // GET /admin: dashboard shell.
        .route("/", get(handlers::admin_dashboard))
        // GET /admin/posts: post management listing shell.
        .route("/posts", get(handlers::admin_posts_page))
        // GET /admin/posts/create: editor shell for a new post.
        .route("/posts/create", get(handlers::admin_post_create_page))
        // GET /admin/posts/edit/{slug}: editor shell for an existing post.
        .route("/posts/edit/{slug}", get(handlers::admin_post_edit_page))
        .route_layer(middleware::from_fn_with_state(state, admin_page_gate));

    Router::new()
        // GET /admin/login: the one ungated admin page.
        .route("/login", get(handlers::admin_login_page))
        .merge(gated)
}

/// admin_page_gate
///
/// Page-level variant of the auth gate. Browsers carry the session in the
/// cookie only, so header extraction is skipped here. Any failure (missing
/// cookie, bad token, non-admin role) lands on the login page;
/// the redirect never explains which check failed.
pub async fn admin_page_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let verified = auth::token_from_cookie(request.headers())
        .and_then(|token| auth::verify_token(&token, &state.config.jwt_secret));

    match verified {
        Some(user) if user.role == Role::Admin => next.run(request).await,
        _ => Redirect::to("/admin/login").into_response(),
    }
}
