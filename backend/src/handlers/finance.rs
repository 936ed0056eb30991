//! Financial reporting HTTP handlers

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::FinanceService;
use crate::AppState;
use shared::finance::FinancialSummary;

/// Get the farm-wide financial summary
pub async fn get_financial_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<FinancialSummary>> {
    let service = FinanceService::new(state.db);
    let summary = service.get_summary().await?;
    Ok(Json(summary))
}

/// Export harvested records as CSV
pub async fn export_harvested_csv(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = FinanceService::new(state.db);
    let csv = service.export_harvested_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"harvested.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
