//! Shared API response types
//!
//! Wire-format structures for the REST surface. Field names stay
//! camelCase (and the resource kind is exposed as `type`) so existing
//! clients of the planner keep working unchanged.

use serde::{Deserialize, Serialize};

use crate::models::{Resource, ResourceWithSessionCount, SessionWithResource, StudySession};

/// Resource as returned by the API, annotated with its session count
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub total_units: Option<i64>,
    pub completed_units: i64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count: Option<i64>,
}

/// Study session as returned by the API, with its linked resource inlined
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: i64,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub is_completed: bool,
    pub reminder_sent: bool,
    pub resource_id: Option<i64>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceResponse>,
}

/// Acknowledgement body for delete operations
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Dashboard summary derived from the session list
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Calendar day the summary was computed for (local time)
    pub date: String,
    pub scheduled_minutes_today: i64,
    pub completed_minutes_today: i64,
    pub completed_this_week: usize,
    /// Up to three not-yet-started sessions for today
    pub next_up: Vec<SessionResponse>,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id,
            title: resource.title,
            kind: resource.kind.to_string(),
            url: resource.url,
            total_units: resource.total_units,
            completed_units: resource.completed_units,
            created_at: resource.created_at.to_rfc3339(),
            session_count: None,
        }
    }
}

impl From<ResourceWithSessionCount> for ResourceResponse {
    fn from(entry: ResourceWithSessionCount) -> Self {
        let mut response = ResourceResponse::from(entry.resource);
        response.session_count = Some(entry.session_count);
        response
    }
}

impl From<StudySession> for SessionResponse {
    fn from(session: StudySession) -> Self {
        Self {
            id: session.id,
            title: session.title,
            start_time: session.start_time.to_rfc3339(),
            end_time: session.end_time.to_rfc3339(),
            is_completed: session.is_completed,
            reminder_sent: session.reminder_sent,
            resource_id: session.resource_id,
            created_at: session.created_at.to_rfc3339(),
            resource: None,
        }
    }
}

impl From<SessionWithResource> for SessionResponse {
    fn from(entry: SessionWithResource) -> Self {
        let mut response = SessionResponse::from(entry.session);
        response.resource = entry.resource.map(Into::into);
        response
    }
}
