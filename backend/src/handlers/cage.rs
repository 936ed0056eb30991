//! Cage management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::cage::{
    BulkFeedInput, CageService, CageSummary, CreateCageInput, SetAlertInput,
};
use crate::AppState;
use shared::lifecycle::UpdateInput;
use shared::models::Cage;
use shared::types::CageSortKey;

/// Query parameters for listing cages
#[derive(Debug, Deserialize)]
pub struct ListCagesQuery {
    pub search: Option<String>,
    pub sort: Option<CageSortKey>,
}

#[derive(Serialize)]
pub struct BulkFeedResponse {
    pub count: i64,
}

/// List cage summaries
pub async fn list_cages(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCagesQuery>,
) -> AppResult<Json<Vec<CageSummary>>> {
    let service = CageService::new(state.db);
    let cages = service
        .get_cages(query.search, query.sort.unwrap_or_default())
        .await?;
    Ok(Json(cages))
}

/// Create a new cage
pub async fn create_cage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCageInput>,
) -> AppResult<(StatusCode, Json<Cage>)> {
    let service = CageService::new(state.db);
    let cage = service.create_cage(input, &current_user.0.email).await?;
    Ok((StatusCode::CREATED, Json(cage)))
}

/// Get a cage with its full history
pub async fn get_cage(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(cage_id): Path<String>,
) -> AppResult<Json<Cage>> {
    let service = CageService::new(state.db);
    let cage = service.get_cage(&cage_id).await?;
    Ok(Json(cage))
}

/// Apply an update transaction to a cage
pub async fn update_cage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(cage_id): Path<String>,
    Json(input): Json<UpdateInput>,
) -> AppResult<Json<Cage>> {
    let service = CageService::new(state.db);
    let cage = service
        .update_cage(&cage_id, input, &current_user.0.email)
        .await?;
    Ok(Json(cage))
}

/// Delete a cage along with its history and notifications
pub async fn delete_cage(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(cage_id): Path<String>,
) -> AppResult<Json<()>> {
    let service = CageService::new(state.db);
    service.delete_cage(&cage_id).await?;
    Ok(Json(()))
}

/// Set or clear the AI alert flag on a cage
pub async fn set_cage_alert(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(cage_id): Path<String>,
    Json(input): Json<SetAlertInput>,
) -> AppResult<Json<Cage>> {
    let service = CageService::new(state.db);
    let cage = service.set_alert(&cage_id, input.ai_alert).await?;
    Ok(Json(cage))
}

/// Mark the selected cages as fed
pub async fn bulk_feed_cages(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<BulkFeedInput>,
) -> AppResult<Json<BulkFeedResponse>> {
    let service = CageService::new(state.db);
    let count = service
        .bulk_feed(&input.cage_ids, &current_user.0.email)
        .await?;
    Ok(Json(BulkFeedResponse { count }))
}
