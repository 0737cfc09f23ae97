//! Dashboard API endpoint
//!
//! A single summary endpoint backing the focus dashboard: today's
//! scheduled/completed minutes, this week's completion count, and the
//! next few upcoming sessions. All derivations live in
//! [`crate::services::schedule`]; this handler just evaluates them at
//! the server's local "now".

use axum::{extract::State, Json};
use chrono::Local;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{DashboardResponse, SessionResponse};
use crate::models::StudySession;
use crate::services::schedule;

/// GET /dashboard - Summary of today's plan
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let entries = state.session_service.list().await?;
    let sessions: Vec<StudySession> = entries.iter().map(|e| e.session.clone()).collect();

    let now = Local::now();

    let next_ids: Vec<i64> = schedule::next_up(&sessions, &now)
        .into_iter()
        .map(|s| s.id)
        .collect();
    // Resolve the picked sessions back to their entries so the linked
    // resources ride along, preserving start-time order.
    let next_up: Vec<SessionResponse> = next_ids
        .iter()
        .filter_map(|id| entries.iter().find(|e| e.session.id == *id))
        .cloned()
        .map(Into::into)
        .collect();

    Ok(Json(DashboardResponse {
        date: now.date_naive().to_string(),
        scheduled_minutes_today: schedule::scheduled_minutes_today(&sessions, &now),
        completed_minutes_today: schedule::completed_minutes_today(&sessions, &now),
        completed_this_week: schedule::completed_count_this_week(&sessions, &now),
        next_up,
    }))
}
