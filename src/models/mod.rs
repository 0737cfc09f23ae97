//! Data models
//!
//! This module contains the data structures used throughout the study
//! planner. Models represent:
//! - Database entities (Resource, StudySession)
//! - Input structs for create/update operations
//! - Join projections (resource with session count, session with resource)

mod resource;
mod study_session;

pub use resource::{CreateResourceInput, Resource, ResourceType, ResourceWithSessionCount};
pub use study_session::{
    CreateSessionInput, SessionWithResource, StudySession, UpdateSessionInput,
};
