//! Services layer - Business logic
//!
//! This module contains the business logic of the study planner.
//! Services are responsible for:
//! - Validating input before it reaches the repositories
//! - Deriving dashboard/calendar views from the session list
//! - Running the periodic reminder sweep and dispatching notifications

pub mod email;
pub mod reminder;
pub mod resource;
pub mod schedule;
pub mod study_session;

pub use email::{EmailService, LogNotifier};
pub use reminder::{ReminderNotifier, ReminderSweep, SessionReminder, SweepStats};
pub use resource::{ResourceService, ResourceServiceError};
pub use schedule::{
    completed_count_this_week, completed_minutes_today, grid_placement, next_up,
    scheduled_minutes_today, sessions_today, upcoming_today, GridPlacement, DAY_END_HOUR,
    DAY_START_HOUR, HOUR_ROW_PX, NEXT_UP_LIMIT,
};
pub use study_session::{StudySessionService, StudySessionServiceError};
