use quillpress::{
    AppState, RateLimiter,
    config::{AppConfig, Env},
    create_router,
    repository::{
        PostRepositoryState, PostgresPostRepository, PostgresUserRepository, UserRepositoryState,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Asynchronous entry point: configuration, logging, database pool, shared
/// state, and the HTTP server, in that order, failing fast on anything
/// missing.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, with sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quillpress=debug,tower_http=info,axum=trace".into());

    // 3. Log format follows the environment: pretty for humans locally,
    // JSON for aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database pool.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresPostRepository::new(pool.clone())) as PostRepositoryState;
    let users = Arc::new(PostgresUserRepository::new(pool)) as UserRepositoryState;

    // 5. Unified state assembly. The rate limiter is owned here, not a
    // process global.
    let app_state = AppState {
        repo,
        users,
        limiter: Arc::new(RateLimiter::new()),
        config,
    };

    // 6. Router and server startup.
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: Failed to bind 0.0.0.0:3000");

    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API documentation available at http://localhost:3000/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server error");
}
