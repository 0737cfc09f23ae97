//! Study session model
//!
//! A study session is a scheduled time block, optionally linked to a
//! resource. Completion is toggled freely by the user; the reminder flag
//! transitions false -> true exactly once, driven by the reminder sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// Study session entity representing a scheduled study block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudySession {
    /// Unique identifier
    pub id: i64,
    /// Session title
    pub title: String,
    /// Scheduled start
    pub start_time: DateTime<Utc>,
    /// Scheduled end; always after `start_time`
    pub end_time: DateTime<Utc>,
    /// Whether the user has marked the session done
    pub is_completed: bool,
    /// Whether a reminder has been dispatched; never reset
    pub reminder_sent: bool,
    /// Optional linked resource (weak reference)
    pub resource_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StudySession {
    /// Create a new StudySession with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(
        title: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        resource_id: Option<i64>,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            title,
            start_time,
            end_time,
            is_completed: false,
            reminder_sent: false,
            resource_id,
            created_at: Utc::now(),
        }
    }

    /// Scheduled duration in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Study session with its linked resource (if any) inlined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWithResource {
    /// The session itself
    #[serde(flatten)]
    pub session: StudySession,
    /// The linked resource, when one is set and still exists
    pub resource: Option<Resource>,
}

/// Input for creating a new study session
#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    /// Session title
    pub title: String,
    /// Scheduled start
    pub start_time: DateTime<Utc>,
    /// Scheduled end
    pub end_time: DateTime<Utc>,
    /// Optional linked resource
    pub resource_id: Option<i64>,
}

/// Input for partially updating a study session.
///
/// Absent fields are left unchanged. `resource_id` uses a nested Option
/// so the link can be explicitly cleared (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct UpdateSessionInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New start time (optional)
    pub start_time: Option<DateTime<Utc>>,
    /// New end time (optional)
    pub end_time: Option<DateTime<Utc>>,
    /// New resource link (optional; `Some(None)` clears it)
    pub resource_id: Option<Option<i64>>,
    /// New completion flag (optional)
    pub is_completed: Option<bool>,
}
