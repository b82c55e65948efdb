use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::dreams::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::polish::orchestrator::{
    polish_dream, polish_text, PolishDreamOutcome, PolishOptions, PolishTextOutcome,
};
use crate::polish::quota::{quota_snapshot, today_utc, QuotaSnapshot};
use crate::state::AppState;

/// Snapshot reads are served from the display cache for this long.
const QUOTA_CACHE_TTL_SECS: u64 = 60;

fn quota_cache_key(user_id: Uuid) -> String {
    format!("polish:quota:{}:{}", user_id, today_utc())
}

#[derive(Debug, Deserialize)]
pub struct PolishDreamRequest {
    pub user_id: Uuid,
    pub instruction: Option<String>,
    pub based_on_version_id: Option<Uuid>,
}

/// POST /api/v1/polish/dream/:id
pub async fn handle_polish_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Json(req): Json<PolishDreamRequest>,
) -> Result<Json<PolishDreamOutcome>, AppError> {
    let outcome = polish_dream(
        &state.db,
        state.rewriter.as_ref(),
        state.config.polish_daily_quota,
        req.user_id,
        dream_id,
        PolishOptions {
            instruction: req.instruction,
            based_on_version_id: req.based_on_version_id,
        },
    )
    .await?;

    if outcome.quota.is_some() {
        state.cache.del(&quota_cache_key(req.user_id)).await;
    }
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct PolishTextRequest {
    pub user_id: Uuid,
    pub content: String,
    pub instruction: Option<String>,
}

/// POST /api/v1/polish/text
pub async fn handle_polish_text(
    State(state): State<AppState>,
    Json(req): Json<PolishTextRequest>,
) -> Result<Json<PolishTextOutcome>, AppError> {
    let outcome = polish_text(
        &state.db,
        state.rewriter.as_ref(),
        state.config.polish_daily_quota,
        req.user_id,
        &req.content,
        req.instruction.as_deref(),
    )
    .await?;

    if outcome.quota.is_some() {
        state.cache.del(&quota_cache_key(req.user_id)).await;
    }
    Ok(Json(outcome))
}

/// GET /api/v1/polish/quota
///
/// Display read: goes through the cache. The orchestrator never consults
/// this path for its own quota decisions.
pub async fn handle_get_quota(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<QuotaSnapshot>, AppError> {
    let key = quota_cache_key(query.user_id);
    if let Some(snapshot) = state.cache.get_json::<QuotaSnapshot>(&key).await {
        return Ok(Json(snapshot));
    }

    let snapshot = quota_snapshot(
        &state.db,
        query.user_id,
        state.config.polish_daily_quota,
    )
    .await?;
    state
        .cache
        .set_json(&key, &snapshot, QUOTA_CACHE_TTL_SECS)
        .await;
    Ok(Json(snapshot))
}
