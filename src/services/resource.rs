//! Resource service
//!
//! Business logic for learning resources: creation with a validated
//! closed type enumeration, progress updates bounded by the known unit
//! total, and deletion (referencing sessions keep existing with their
//! link cleared).

use crate::db::repositories::ResourceRepository;
use crate::models::{CreateResourceInput, Resource, ResourceWithSessionCount};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for resource service operations
#[derive(Debug, thiserror::Error)]
pub enum ResourceServiceError {
    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Resource service for managing learning materials
pub struct ResourceService {
    repo: Arc<dyn ResourceRepository>,
}

impl ResourceService {
    /// Create a new resource service
    pub fn new(repo: Arc<dyn ResourceRepository>) -> Self {
        Self { repo }
    }

    /// List all resources ordered by title, each with the number of
    /// study sessions linked to it
    pub async fn list(&self) -> Result<Vec<ResourceWithSessionCount>, ResourceServiceError> {
        self.repo
            .list_with_session_counts()
            .await
            .context("Failed to list resources")
            .map_err(Into::into)
    }

    /// Get a resource by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Resource>, ResourceServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get resource")
            .map_err(Into::into)
    }

    /// Create a new resource.
    ///
    /// `completed_units` always starts at 0.
    pub async fn create(
        &self,
        input: CreateResourceInput,
    ) -> Result<Resource, ResourceServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ResourceServiceError::ValidationError(
                "Resource title cannot be empty".to_string(),
            ));
        }

        if let Some(total) = input.total_units {
            if total < 0 {
                return Err(ResourceServiceError::ValidationError(
                    "Total units cannot be negative".to_string(),
                ));
            }
        }

        let resource = Resource::new(title.to_string(), input.kind, input.url, input.total_units);
        let created = self
            .repo
            .create(&resource)
            .await
            .context("Failed to create resource")?;

        Ok(created)
    }

    /// Overwrite the completed-units counter for a resource.
    ///
    /// The new value must be non-negative and, when the resource has a
    /// known total, must not exceed it.
    pub async fn update_progress(
        &self,
        id: i64,
        completed_units: i64,
    ) -> Result<Resource, ResourceServiceError> {
        if completed_units < 0 {
            return Err(ResourceServiceError::ValidationError(
                "Completed units cannot be negative".to_string(),
            ));
        }

        let resource = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get resource")?
            .ok_or_else(|| {
                ResourceServiceError::NotFound(format!("Resource with ID {} not found", id))
            })?;

        if let Some(total) = resource.total_units {
            if completed_units > total {
                return Err(ResourceServiceError::ValidationError(format!(
                    "Completed units ({}) cannot exceed total units ({})",
                    completed_units, total
                )));
            }
        }

        let updated = self
            .repo
            .update_progress(id, completed_units)
            .await
            .context("Failed to update resource progress")?
            .ok_or_else(|| {
                ResourceServiceError::NotFound(format!("Resource with ID {} not found", id))
            })?;

        Ok(updated)
    }

    /// Delete a resource. Sessions referencing it are detached, not
    /// deleted.
    pub async fn delete(&self, id: i64) -> Result<(), ResourceServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete resource")?;

        if !deleted {
            return Err(ResourceServiceError::NotFound(format!(
                "Resource with ID {} not found",
                id
            )));
        }

        Ok(())
    }
}
