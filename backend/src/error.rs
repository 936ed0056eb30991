//! Error handling for the Crab Farm Management Platform
//!
//! Provides consistent error responses in English and Vietnamese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        message_vi: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_vi: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_vi: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Advisor service error: {0}")]
    AdvisorError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<shared::LifecycleError> for AppError {
    fn from(err: shared::LifecycleError) -> Self {
        use shared::LifecycleError;

        match err {
            LifecycleError::MissingWeight => AppError::Validation {
                field: "new_weight_g".to_string(),
                message: "New weight is required".to_string(),
                message_vi: "Vui lòng nhập trọng lượng mới.".to_string(),
            },
            LifecycleError::NegativeWeight => AppError::Validation {
                field: "new_weight_g".to_string(),
                message: "Weight cannot be negative".to_string(),
                message_vi: "Trọng lượng không được là số âm.".to_string(),
            },
            LifecycleError::NegativeAmount(what) => AppError::Validation {
                field: what.replace(' ', "_"),
                message: format!("{} cannot be negative", what),
                message_vi: "Giá trị không được là số âm.".to_string(),
            },
            LifecycleError::InvalidFinalWeight => AppError::Validation {
                field: "final_weight_g".to_string(),
                message: "Final weight must be greater than zero".to_string(),
                message_vi: "Trọng lượng thu hoạch phải lớn hơn 0.".to_string(),
            },
            LifecycleError::InvalidPrice => AppError::Validation {
                field: "price_per_kg".to_string(),
                message: "Price per kg must be greater than zero".to_string(),
                message_vi: "Giá bán phải lớn hơn 0.".to_string(),
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Unauthorized { message, message_vi } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: None,
                },
            ),
            AppError::Validation { field, message, message_vi } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_vi: "Đã xảy ra lỗi. Vui lòng thử lại.".to_string(),
                    field: None,
                },
            ),
            AppError::Conflict { resource, message, message_vi } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_vi: format!("Không tìm thấy {}", resource),
                    field: None,
                },
            ),
            AppError::AdvisorError(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "ADVISOR_ERROR".to_string(),
                    message_en: format!("Advisor service error: {}", msg),
                    message_vi: "Đã xảy ra lỗi khi kết nối với AI. Vui lòng thử lại sau.".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_vi: "Đã xảy ra lỗi. Vui lòng thử lại.".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_vi: "Đã xảy ra lỗi. Vui lòng thử lại.".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
