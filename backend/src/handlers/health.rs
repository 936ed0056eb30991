//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
}

/// Health check endpoint handler
///
/// The readiness query goes through the cages table so a pool that connects
/// to an unmigrated database still reports as down.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_status = match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cages")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_names_this_service() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: "connected".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["service"], "crab-farm-management-backend");
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], "connected");
    }
}
