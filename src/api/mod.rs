//! API layer - HTTP handlers and routing
//!
//! This module contains the REST surface of the study planner:
//! - Resource endpoints (list/create/progress/delete)
//! - Study session endpoints (list/create/update/status/delete)
//! - Dashboard summary endpoint
//! - A root liveness probe

pub mod dashboard;
pub mod middleware;
pub mod resources;
pub mod responses;
pub mod sessions;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// GET / - liveness probe
async fn root() -> &'static str {
    "Study Planner API is running"
}

/// Build the API router with all endpoint groups
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/dashboard", get(dashboard::get_dashboard))
        .nest("/resources", resources::router())
        .nest("/sessions", sessions::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    build_api_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::responses::{MessageResponse, ResourceResponse, SessionResponse};
    use crate::db::repositories::{SqlxResourceRepository, SqlxStudySessionRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::services::{ResourceService, StudySessionService};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let resource_repo = SqlxResourceRepository::boxed(pool.clone());
        let session_repo = SqlxStudySessionRepository::boxed(pool.clone());

        let state = AppState {
            pool: pool.clone(),
            resource_service: Arc::new(ResourceService::new(resource_repo.clone())),
            session_service: Arc::new(StudySessionService::new(session_repo, resource_repo)),
        };

        TestServer::new(build_router(state, "http://localhost:5173"))
            .expect("Failed to start test server")
    }

    #[tokio::test]
    async fn test_root_liveness() {
        let server = test_server().await;

        let response = server.get("/").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Study Planner API is running");
    }

    #[tokio::test]
    async fn test_plan_a_study_session_end_to_end() {
        let server = test_server().await;

        // Create a resource
        let response = server
            .post("/resources")
            .json(&json!({
                "title": "Clean Code",
                "type": "BOOK",
                "totalUnits": 17
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let resource: ResourceResponse = response.json();
        assert_eq!(resource.kind, "BOOK");

        // Schedule a session against it
        let start = Utc::now() + Duration::hours(2);
        let response = server
            .post("/sessions")
            .json(&json!({
                "title": "Read Ch.4",
                "startTime": start.to_rfc3339(),
                "endTime": (start + Duration::hours(1)).to_rfc3339(),
                "resourceId": resource.id
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let session: SessionResponse = response.json();

        // Listing inlines the resource
        let response = server.get("/sessions").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let sessions: Vec<SessionResponse> = response.json();
        assert_eq!(sessions.len(), 1);
        let embedded = sessions[0].resource.as_ref().expect("resource embedded");
        assert_eq!(embedded.title, "Clean Code");
        assert!(!sessions[0].is_completed);

        // Mark it done
        let response = server
            .patch(&format!("/sessions/{}/status", session.id))
            .json(&json!({ "isCompleted": true }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server.get("/sessions").await;
        let sessions: Vec<SessionResponse> = response.json();
        assert!(sessions[0].is_completed);
    }

    #[tokio::test]
    async fn test_create_resource_rejects_unknown_type() {
        let server = test_server().await;

        let response = server
            .post("/resources")
            .json(&json!({
                "title": "A podcast",
                "type": "PODCAST"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_resource_list_with_session_counts() {
        let server = test_server().await;

        let resource: ResourceResponse = server
            .post("/resources")
            .json(&json!({ "title": "The Rust Book", "type": "BOOK" }))
            .await
            .json();
        server
            .post("/resources")
            .json(&json!({ "title": "Algorithms", "type": "COURSE" }))
            .await;

        let start = Utc::now() + Duration::hours(1);
        server
            .post("/sessions")
            .json(&json!({
                "title": "Ownership chapter",
                "startTime": start.to_rfc3339(),
                "endTime": (start + Duration::hours(1)).to_rfc3339(),
                "resourceId": resource.id
            }))
            .await;

        let resources: Vec<ResourceResponse> = server.get("/resources").await.json();

        // Ordered by title ascending
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].title, "Algorithms");
        assert_eq!(resources[0].session_count, Some(0));
        assert_eq!(resources[1].title, "The Rust Book");
        assert_eq!(resources[1].session_count, Some(1));
    }

    #[tokio::test]
    async fn test_update_progress_and_bounds() {
        let server = test_server().await;

        let resource: ResourceResponse = server
            .post("/resources")
            .json(&json!({ "title": "Clean Code", "type": "BOOK", "totalUnits": 17 }))
            .await
            .json();

        let response = server
            .put(&format!("/resources/{}/progress", resource.id))
            .json(&json!({ "completedUnits": 5 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let updated: ResourceResponse = response.json();
        assert_eq!(updated.completed_units, 5);

        // Beyond the known total
        let response = server
            .put(&format!("/resources/{}/progress", resource.id))
            .json(&json!({ "completedUnits": 30 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_progress_missing_resource_is_404() {
        let server = test_server().await;

        let response = server
            .put("/resources/9999/progress")
            .json(&json!({ "completedUnits": 1 }))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_resource_detaches_sessions() {
        let server = test_server().await;

        let resource: ResourceResponse = server
            .post("/resources")
            .json(&json!({ "title": "Linked", "type": "VIDEO" }))
            .await
            .json();

        let start = Utc::now() + Duration::hours(1);
        server
            .post("/sessions")
            .json(&json!({
                "title": "Watch",
                "startTime": start.to_rfc3339(),
                "endTime": (start + Duration::minutes(45)).to_rfc3339(),
                "resourceId": resource.id
            }))
            .await;

        let response = server.delete(&format!("/resources/{}", resource.id)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let ack: MessageResponse = response.json();
        assert_eq!(ack.message, "Resource deleted successfully");

        // The session survives without its link
        let sessions: Vec<SessionResponse> = server.get("/sessions").await.json();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].resource_id, None);
        assert!(sessions[0].resource.is_none());
    }

    #[tokio::test]
    async fn test_create_session_rejects_inverted_range() {
        let server = test_server().await;

        let start = Utc::now();
        let response = server
            .post("/sessions")
            .json(&json!({
                "title": "Backwards",
                "startTime": start.to_rfc3339(),
                "endTime": (start - Duration::hours(1)).to_rfc3339()
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_partial_update_via_put() {
        let server = test_server().await;

        let start = Utc::now() + Duration::hours(1);
        let session: SessionResponse = server
            .post("/sessions")
            .json(&json!({
                "title": "Original",
                "startTime": start.to_rfc3339(),
                "endTime": (start + Duration::hours(1)).to_rfc3339()
            }))
            .await
            .json();

        let response = server
            .put(&format!("/sessions/{}", session.id))
            .json(&json!({ "title": "Renamed" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let updated: SessionResponse = response.json();
        assert_eq!(updated.title, "Renamed");
        // Untouched fields survive
        assert_eq!(updated.start_time, session.start_time);
        assert_eq!(updated.end_time, session.end_time);
    }

    #[tokio::test]
    async fn test_delete_session_then_404() {
        let server = test_server().await;

        let start = Utc::now() + Duration::hours(1);
        let session: SessionResponse = server
            .post("/sessions")
            .json(&json!({
                "title": "Short lived",
                "startTime": start.to_rfc3339(),
                "endTime": (start + Duration::minutes(30)).to_rfc3339()
            }))
            .await
            .json();

        let response = server.delete(&format!("/sessions/{}", session.id)).await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server.delete(&format!("/sessions/{}", session.id)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let server = test_server().await;

        // A completed session right now always lands in the current week
        let start = Utc::now();
        let session: SessionResponse = server
            .post("/sessions")
            .json(&json!({
                "title": "Just finished",
                "startTime": start.to_rfc3339(),
                "endTime": (start + Duration::hours(1)).to_rfc3339()
            }))
            .await
            .json();
        server
            .patch(&format!("/sessions/{}/status", session.id))
            .json(&json!({ "isCompleted": true }))
            .await;

        let response = server.get("/dashboard").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let dashboard: serde_json::Value = response.json();

        assert_eq!(dashboard["completedThisWeek"], 1);
        assert!(dashboard["nextUp"].as_array().unwrap().len() <= 3);
    }
}
