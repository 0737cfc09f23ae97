//! Shared API plumbing
//!
//! Application state handed to every handler, and the JSON error
//! envelope. Service-layer errors map onto distinct HTTP statuses:
//! missing identifiers become 404, rejected input 400, everything else
//! a 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::resource::ResourceServiceError;
use crate::services::study_session::StudySessionServiceError;
use crate::services::{ResourceService, StudySessionService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub resource_service: Arc<ResourceService>,
    pub session_service: Arc<StudySessionService>,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ResourceServiceError> for ApiError {
    fn from(err: ResourceServiceError) -> Self {
        match err {
            ResourceServiceError::NotFound(message) => ApiError::not_found(message),
            ResourceServiceError::ValidationError(message) => ApiError::validation_error(message),
            ResourceServiceError::InternalError(e) => {
                tracing::error!("Resource service error: {:#}", e);
                ApiError::internal_error(e.to_string())
            }
        }
    }
}

impl From<StudySessionServiceError> for ApiError {
    fn from(err: StudySessionServiceError) -> Self {
        match err {
            StudySessionServiceError::NotFound(message) => ApiError::not_found(message),
            StudySessionServiceError::ValidationError(message) => {
                ApiError::validation_error(message)
            }
            StudySessionServiceError::InternalError(e) => {
                tracing::error!("Study session service error: {:#}", e);
                ApiError::internal_error(e.to_string())
            }
        }
    }
}
