//! Study session service
//!
//! Business logic for scheduled study blocks: creation and partial
//! updates with time-range validation, the narrow completion toggle,
//! and deletion. Overlapping sessions are allowed; double-booking is a
//! user decision, not an error.

use crate::db::repositories::{ResourceRepository, StudySessionRepository};
use crate::models::{
    CreateSessionInput, SessionWithResource, StudySession, UpdateSessionInput,
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for study session service operations
#[derive(Debug, thiserror::Error)]
pub enum StudySessionServiceError {
    /// Session not found
    #[error("Study session not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Study session service
pub struct StudySessionService {
    repo: Arc<dyn StudySessionRepository>,
    resource_repo: Arc<dyn ResourceRepository>,
}

impl StudySessionService {
    /// Create a new study session service
    pub fn new(
        repo: Arc<dyn StudySessionRepository>,
        resource_repo: Arc<dyn ResourceRepository>,
    ) -> Self {
        Self {
            repo,
            resource_repo,
        }
    }

    /// List all sessions ordered by start time, linked resources inlined
    pub async fn list(&self) -> Result<Vec<SessionWithResource>, StudySessionServiceError> {
        self.repo
            .list_with_resources()
            .await
            .context("Failed to list study sessions")
            .map_err(Into::into)
    }

    /// Get a session by ID
    pub async fn get_by_id(
        &self,
        id: i64,
    ) -> Result<Option<StudySession>, StudySessionServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get study session")
            .map_err(Into::into)
    }

    /// Schedule a new session.
    pub async fn create(
        &self,
        input: CreateSessionInput,
    ) -> Result<StudySession, StudySessionServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(StudySessionServiceError::ValidationError(
                "Session title cannot be empty".to_string(),
            ));
        }

        if input.end_time <= input.start_time {
            return Err(StudySessionServiceError::ValidationError(
                "Session end time must be after start time".to_string(),
            ));
        }

        if let Some(resource_id) = input.resource_id {
            self.ensure_resource_exists(resource_id).await?;
        }

        let session = StudySession::new(
            title.to_string(),
            input.start_time,
            input.end_time,
            input.resource_id,
        );
        let created = self
            .repo
            .create(&session)
            .await
            .context("Failed to create study session")?;

        Ok(created)
    }

    /// Partially update a session. Absent fields are left unchanged;
    /// the merged time range is validated as a whole.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateSessionInput,
    ) -> Result<StudySession, StudySessionServiceError> {
        let mut session = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get study session")?
            .ok_or_else(|| {
                StudySessionServiceError::NotFound(format!("Session with ID {} not found", id))
            })?;

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(StudySessionServiceError::ValidationError(
                    "Session title cannot be empty".to_string(),
                ));
            }
            session.title = title;
        }
        if let Some(start_time) = input.start_time {
            session.start_time = start_time;
        }
        if let Some(end_time) = input.end_time {
            session.end_time = end_time;
        }
        if let Some(resource_id) = input.resource_id {
            if let Some(resource_id) = resource_id {
                self.ensure_resource_exists(resource_id).await?;
            }
            session.resource_id = resource_id;
        }
        if let Some(is_completed) = input.is_completed {
            session.is_completed = is_completed;
        }

        if session.end_time <= session.start_time {
            return Err(StudySessionServiceError::ValidationError(
                "Session end time must be after start time".to_string(),
            ));
        }

        let updated = self
            .repo
            .update(&session)
            .await
            .context("Failed to update study session")?
            .ok_or_else(|| {
                StudySessionServiceError::NotFound(format!("Session with ID {} not found", id))
            })?;

        Ok(updated)
    }

    /// Toggle only the completion flag. Independent of time: a session
    /// can be marked done before or after its scheduled window.
    pub async fn set_completed(
        &self,
        id: i64,
        is_completed: bool,
    ) -> Result<StudySession, StudySessionServiceError> {
        let updated = self
            .repo
            .set_completed(id, is_completed)
            .await
            .context("Failed to update session status")?
            .ok_or_else(|| {
                StudySessionServiceError::NotFound(format!("Session with ID {} not found", id))
            })?;

        Ok(updated)
    }

    /// Delete a session
    pub async fn delete(&self, id: i64) -> Result<(), StudySessionServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete study session")?;

        if !deleted {
            return Err(StudySessionServiceError::NotFound(format!(
                "Session with ID {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn ensure_resource_exists(
        &self,
        resource_id: i64,
    ) -> Result<(), StudySessionServiceError> {
        let exists = self
            .resource_repo
            .get_by_id(resource_id)
            .await
            .context("Failed to check linked resource")?
            .is_some();

        if !exists {
            return Err(StudySessionServiceError::ValidationError(format!(
                "Linked resource with ID {} does not exist",
                resource_id
            )));
        }

        Ok(())
    }
}
