//! Resource API endpoints
//!
//! Handles HTTP requests for learning resources:
//! - GET /resources - List resources with session counts
//! - POST /resources - Create resource
//! - PUT /resources/:id/progress - Update completed units
//! - DELETE /resources/:id - Delete resource

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{MessageResponse, ResourceResponse};
use crate::models::{CreateResourceInput, ResourceType};

/// Request body for creating a resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: String,
    /// One of BOOK, VIDEO, COURSE
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub total_units: Option<i64>,
}

/// Request body for overwriting the progress counter
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub completed_units: i64,
}

/// Build the resources router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route("/{id}/progress", put(update_progress))
        .route("/{id}", delete(delete_resource))
}

/// GET /resources - List resources with session counts
async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    let resources = state.resource_service.list().await?;

    Ok(Json(resources.into_iter().map(Into::into).collect()))
}

/// POST /resources - Create resource
async fn create_resource(
    State(state): State<AppState>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceResponse>), ApiError> {
    let kind = ResourceType::parse(&request.kind).ok_or_else(|| {
        ApiError::validation_error(format!(
            "Invalid resource type '{}': expected BOOK, VIDEO or COURSE",
            request.kind
        ))
    })?;

    let created = state
        .resource_service
        .create(CreateResourceInput {
            title: request.title,
            kind,
            url: request.url,
            total_units: request.total_units,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /resources/:id/progress - Update completed units
async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProgressRequest>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let updated = state
        .resource_service
        .update_progress(id, request.completed_units)
        .await?;

    Ok(Json(updated.into()))
}

/// DELETE /resources/:id - Delete resource
///
/// Sessions linked to the resource survive with their link cleared.
async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.resource_service.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Resource deleted successfully".to_string(),
    }))
}
