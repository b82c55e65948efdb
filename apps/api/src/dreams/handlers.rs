use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dreams::store::{
    create_dream, delete_dream, list_dreams, load_owned_dream, update_dream, DreamPage,
};
use crate::errors::AppError;
use crate::models::dream::{DreamRow, DreamVersionRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateDreamRequest {
    pub user_id: Uuid,
    pub content: String,
    pub is_public: Option<bool>,
}

/// POST /api/v1/dreams
pub async fn handle_create_dream(
    State(state): State<AppState>,
    Json(req): Json<CreateDreamRequest>,
) -> Result<Json<DreamRow>, AppError> {
    let dream = create_dream(
        &state.db,
        req.user_id,
        &req.content,
        req.is_public.unwrap_or(false),
    )
    .await?;
    Ok(Json(dream))
}

#[derive(Debug, Deserialize)]
pub struct DreamListQuery {
    pub user_id: Uuid,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/v1/dreams
pub async fn handle_list_dreams(
    State(state): State<AppState>,
    Query(query): Query<DreamListQuery>,
) -> Result<Json<DreamPage>, AppError> {
    let page = list_dreams(
        &state.db,
        query.user_id,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(20),
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/v1/dreams/:id
pub async fn handle_get_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<DreamRow>, AppError> {
    let dream = load_owned_dream(&state.db, dream_id, query.user_id).await?;
    Ok(Json(dream))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDreamRequest {
    pub user_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateDreamResponse {
    pub dream: DreamRow,
    pub version: DreamVersionRow,
}

/// PATCH /api/v1/dreams/:id
pub async fn handle_update_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Json(req): Json<UpdateDreamRequest>,
) -> Result<Json<UpdateDreamResponse>, AppError> {
    let (dream, version) = update_dream(&state.db, dream_id, req.user_id, &req.content).await?;
    Ok(Json(UpdateDreamResponse { dream, version }))
}

/// DELETE /api/v1/dreams/:id
pub async fn handle_delete_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Query(query): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_dream(&state.db, dream_id, query.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
