use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::Cache;
use crate::config::Config;
use crate::polish::rewrite::RewriteEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Display-only cache. Never consulted for quota consumption or version
    /// switching — Postgres is the single source of truth for both.
    pub cache: Cache,
    /// Pluggable rewrite backend. Production: `LlmRewriter` over the LLM client.
    pub rewriter: Arc<dyn RewriteEngine>,
    pub config: Config,
}
