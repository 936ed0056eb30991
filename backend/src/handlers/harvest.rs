//! Harvest HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::harvest::{HarvestInput, HarvestService, HarvestedCageDetail};
use crate::AppState;
use shared::models::HarvestedCage;

/// Settle a cage into a harvested record
pub async fn harvest_cage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(cage_id): Path<String>,
    Json(input): Json<HarvestInput>,
) -> AppResult<(StatusCode, Json<HarvestedCage>)> {
    let service = HarvestService::new(state.db);
    let record = service
        .harvest_cage(&cage_id, input, &current_user.0.email)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List harvested records, most recent first
pub async fn list_harvested(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<HarvestedCage>>> {
    let service = HarvestService::new(state.db);
    let harvested = service.get_harvested().await?;
    Ok(Json(harvested))
}

/// Get one harvested record with its preserved log
pub async fn get_harvested_cage(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(cage_id): Path<String>,
) -> AppResult<Json<HarvestedCageDetail>> {
    let service = HarvestService::new(state.db);
    let detail = service.get_harvested_cage(&cage_id).await?;
    Ok(Json(detail))
}
