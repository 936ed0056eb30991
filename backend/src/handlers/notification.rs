//! Notification HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::NotificationService;
use crate::AppState;
use shared::models::Notification;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub count: i64,
}

/// List notifications, most recent first
pub async fn list_notifications(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service.get_notifications(query.limit).await?;
    Ok(Json(notifications))
}

/// Get the unread notification count
pub async fn get_unread_count(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db);
    let count = service.get_unread_count().await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Derive notifications from the current cage states and persist new ones
pub async fn sync_notifications(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let created = service.sync_notifications().await?;
    Ok(Json(created))
}

/// Mark every notification as read
pub async fn mark_all_read(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let service = NotificationService::new(state.db);
    let count = service.mark_all_read().await?;
    Ok(Json(MarkAllReadResponse { count }))
}
