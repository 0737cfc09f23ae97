//! Repository layer
//!
//! Trait-based data access for the study planner. Each aggregate gets a
//! repository trait plus a SQLx implementation covering both supported
//! database drivers. Repositories are constructed at startup and passed
//! to services as trait objects.

mod resource;
mod study_session;

pub use resource::{ResourceRepository, SqlxResourceRepository};
pub use study_session::{SqlxStudySessionRepository, StudySessionRepository};
