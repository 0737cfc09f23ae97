//! Study session API endpoints
//!
//! Handles HTTP requests for scheduled study blocks:
//! - GET /sessions - List sessions with linked resources
//! - POST /sessions - Create session
//! - PUT /sessions/:id - Partial update
//! - PATCH /sessions/:id/status - Toggle completion
//! - DELETE /sessions/:id - Delete session

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{MessageResponse, SessionResponse};
use crate::models::{CreateSessionInput, UpdateSessionInput};

/// Request body for scheduling a session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub resource_id: Option<i64>,
}

/// Request body for a partial session update.
///
/// Fields left out of the JSON are untouched; `resourceId: null`
/// explicitly clears the link.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub resource_id: Option<Option<i64>>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Request body for the completion toggle
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_completed: bool,
}

// Distinguishes an absent field (outer None) from an explicit null
// (Some(None)).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Build the sessions router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/{id}", put(update_session).delete(delete_session))
        .route("/{id}/status", patch(update_session_status))
}

/// GET /sessions - List sessions ordered by start time
async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state.session_service.list().await?;

    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

/// POST /sessions - Create session
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let created = state
        .session_service
        .create(CreateSessionInput {
            title: request.title,
            start_time: request.start_time,
            end_time: request.end_time,
            resource_id: request.resource_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /sessions/:id - Partial update
async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let updated = state
        .session_service
        .update(
            id,
            UpdateSessionInput {
                title: request.title,
                start_time: request.start_time,
                end_time: request.end_time,
                resource_id: request.resource_id,
                is_completed: request.is_completed,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// PATCH /sessions/:id/status - Toggle completion
async fn update_session_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let updated = state
        .session_service
        .set_completed(id, request.is_completed)
        .await?;

    Ok(Json(updated.into()))
}

/// DELETE /sessions/:id - Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.session_service.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Session deleted successfully".to_string(),
    }))
}
