//! HTTP response envelope and error mapping
//!
//! Every JSON response, successful or not, is wrapped in [`ApiResponse`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult, RepositoryError};
use crate::services::stream_prober::ProbeError;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Status code an [`AppError`] is rendered with
pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } | AppError::Repository(RepositoryError::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        AppError::Conflict { .. }
        | AppError::Repository(RepositoryError::ConstraintViolation { .. }) => StatusCode::CONFLICT,
        AppError::Probe(probe) if probe.is_caller_error() => StatusCode::BAD_REQUEST,
        AppError::Probe(ProbeError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        AppError::Probe(_) => StatusCode::BAD_GATEWAY,
        AppError::Database(_) | AppError::Repository(_) | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let status = status_for(&error);
    let message = match &error {
        AppError::Validation { message } => message.clone(),
        AppError::NotFound { resource, id } => format!("{resource} with id '{id}' not found"),
        AppError::Repository(RepositoryError::NotFound { resource, id }) => {
            format!("{resource} with id '{id}' not found")
        }
        AppError::Conflict { resource, message } => format!("{resource} conflict: {message}"),
        AppError::Probe(probe) => probe.to_string(),
        AppError::Database(_) | AppError::Repository(_) => {
            error!("Data access failed: {}", error);
            "Data access failed".to_string()
        }
        AppError::Internal { .. } => {
            error!("Request failed: {}", error);
            error.to_string()
        }
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// 200 with the data, or the mapped error
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => ok(data),
        Err(error) => handle_error(error),
    }
}

/// 201 with the data, or the mapped error
pub fn handle_created<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => created(data),
        Err(error) => handle_error(error),
    }
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(message.into())),
    )
        .into_response()
}

/// Body of a successful delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub id: i32,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub database_type: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
