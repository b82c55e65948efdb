use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::dreams::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::models::dream::DreamVersionRow;
use crate::state::AppState;
use crate::versions::store::{list_versions, switch_current, version_detail, SwitchOutcome, VersionListing};

/// GET /api/v1/dreams/:id/versions
pub async fn handle_list_versions(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<VersionListing>, AppError> {
    let listing = list_versions(&state.db, dream_id, query.user_id).await?;
    Ok(Json(listing))
}

/// GET /api/v1/versions/:id
pub async fn handle_version_detail(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<DreamVersionRow>, AppError> {
    let version = version_detail(&state.db, version_id, query.user_id).await?;
    Ok(Json(version))
}

#[derive(Debug, Deserialize)]
pub struct SwitchVersionRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/dreams/:id/versions/:version_id/switch
pub async fn handle_switch_version(
    State(state): State<AppState>,
    Path((dream_id, version_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SwitchVersionRequest>,
) -> Result<Json<SwitchOutcome>, AppError> {
    let outcome = switch_current(&state.db, dream_id, req.user_id, version_id).await?;
    Ok(Json(outcome))
}
