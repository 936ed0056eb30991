//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::auth::{AuthService, AuthTokens, RegisterInput, RegisterResponse};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let auth_service = AuthService::new(state.db, &state.config);
    let response = auth_service.register(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthTokens>> {
    let auth_service = AuthService::new(state.db, &state.config);
    let tokens = auth_service.login(&body.email, &body.password).await?;
    Ok(Json(tokens))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    let auth_service = AuthService::new(state.db, &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}
