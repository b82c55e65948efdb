mod achievements;
mod cache;
mod config;
mod db;
mod dreams;
mod errors;
mod llm_client;
mod models;
mod polish;
mod routes;
mod state;
mod versions;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::Cache;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::polish::rewrite::{LlmRewriter, RewriteEngine};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Somnia API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    info!("Database migrations applied");

    // Initialize the display-only Redis cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Cache::new(redis);
    info!("Redis display cache initialized");

    // Initialize the rewrite engine over the LLM client
    let rewriter: Arc<dyn RewriteEngine> =
        Arc::new(LlmRewriter::new(LlmClient::new(config.anthropic_api_key.clone())));
    info!("Rewrite engine initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        db,
        cache,
        rewriter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
