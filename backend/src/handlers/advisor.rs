//! AI advisor HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::advisor::{
    AdvisorService, ChatReply, ChatSessionResponse, GenerateReportInput, Report, SendMessageInput,
};
use crate::AppState;
use shared::models::AIHealthReport;

/// Start a chat session seeded with the current farm snapshot
pub async fn start_chat_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<(StatusCode, Json<ChatSessionResponse>)> {
    let service = AdvisorService::new(state.db.clone(), &state.config);
    let session = service.start_session(current_user.0.user_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Send a chat message and return the advisor's reply
pub async fn send_chat_message(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<Uuid>,
    Json(input): Json<SendMessageInput>,
) -> AppResult<Json<ChatReply>> {
    let service = AdvisorService::new(state.db.clone(), &state.config);
    let reply = service
        .send_message(session_id, current_user.0.user_id, &input.message)
        .await?;
    Ok(Json(reply))
}

/// Generate a farm report of the requested type
pub async fn generate_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<GenerateReportInput>,
) -> AppResult<Json<Report>> {
    let service = AdvisorService::new(state.db.clone(), &state.config);
    let report = service.generate_report(input.report_type).await?;
    Ok(Json(report))
}

/// Run the AI health analysis for one cage
pub async fn cage_health_check(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(cage_id): Path<String>,
) -> AppResult<Json<AIHealthReport>> {
    let service = AdvisorService::new(state.db.clone(), &state.config);
    let report = service.health_check(&cage_id).await?;
    Ok(Json(report))
}
