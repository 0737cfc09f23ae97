//! Schedule views
//!
//! Pure derivations over the session list: the dashboard's "today"
//! slice, the next-up list, the weekly completion count, minute totals,
//! and the calendar grid placement math. All functions are I/O-free and
//! take an explicit "now" so callers decide the time zone (the server
//! uses local time; tests pin a fixed zone).

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike};

use crate::models::StudySession;

/// First hour shown in the calendar grid (07:00)
pub const DAY_START_HOUR: f64 = 7.0;
/// Hour the calendar grid ends at (22:00)
pub const DAY_END_HOUR: f64 = 22.0;
/// Pixel height of one hour row
pub const HOUR_ROW_PX: f64 = 64.0;
/// How many upcoming sessions the dashboard surfaces
pub const NEXT_UP_LIMIT: usize = 3;

/// Vertical placement of a session block in the calendar grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlacement {
    /// Offset from the top of the grid, in pixels
    pub top: f64,
    /// Block height, in pixels
    pub height: f64,
}

fn start_date_in<Tz: TimeZone>(session: &StudySession, tz: &Tz) -> NaiveDate {
    session.start_time.with_timezone(tz).date_naive()
}

/// Sessions whose start falls on the calendar day of `now`.
pub fn sessions_today<'a, Tz: TimeZone>(
    sessions: &'a [StudySession],
    now: &DateTime<Tz>,
) -> Vec<&'a StudySession> {
    let today = now.date_naive();
    sessions
        .iter()
        .filter(|s| start_date_in(s, &now.timezone()) == today)
        .collect()
}

/// Today's not-yet-completed sessions starting strictly after `now`,
/// ascending by start time. The dashboard shows the first
/// [`NEXT_UP_LIMIT`] of these.
pub fn upcoming_today<'a, Tz: TimeZone>(
    sessions: &'a [StudySession],
    now: &DateTime<Tz>,
) -> Vec<&'a StudySession> {
    let mut upcoming: Vec<&StudySession> = sessions_today(sessions, now)
        .into_iter()
        .filter(|s| !s.is_completed && s.start_time > now.to_utc())
        .collect();
    upcoming.sort_by_key(|s| s.start_time);
    upcoming
}

/// The first [`NEXT_UP_LIMIT`] upcoming sessions for today.
pub fn next_up<'a, Tz: TimeZone>(
    sessions: &'a [StudySession],
    now: &DateTime<Tz>,
) -> Vec<&'a StudySession> {
    let mut upcoming = upcoming_today(sessions, now);
    upcoming.truncate(NEXT_UP_LIMIT);
    upcoming
}

/// Completed sessions starting within the current week.
///
/// Weeks run Monday through Sunday in the calendar of `now`; a session
/// counts if its start date falls inside that range, so Monday 00:00:01
/// is in and the preceding Sunday 23:59:59 is out.
pub fn completed_count_this_week<Tz: TimeZone>(
    sessions: &[StudySession],
    now: &DateTime<Tz>,
) -> usize {
    let today = now.date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);

    sessions
        .iter()
        .filter(|s| {
            if !s.is_completed {
                return false;
            }
            let date = start_date_in(s, &now.timezone());
            date >= monday && date <= sunday
        })
        .count()
}

/// Total scheduled minutes across today's sessions.
pub fn scheduled_minutes_today<Tz: TimeZone>(
    sessions: &[StudySession],
    now: &DateTime<Tz>,
) -> i64 {
    sessions_today(sessions, now)
        .iter()
        .map(|s| s.duration_minutes())
        .sum()
}

/// Total minutes across today's completed sessions.
pub fn completed_minutes_today<Tz: TimeZone>(
    sessions: &[StudySession],
    now: &DateTime<Tz>,
) -> i64 {
    sessions_today(sessions, now)
        .iter()
        .filter(|s| s.is_completed)
        .map(|s| s.duration_minutes())
        .sum()
}

/// Vertical placement of a session block within the 07:00-22:00 grid.
///
/// The offset is measured from the top of the grid at
/// [`HOUR_ROW_PX`] pixels per hour. Blocks are clipped to the display
/// window; a session entirely outside it has no placement.
pub fn grid_placement<Tz: TimeZone>(session: &StudySession, tz: &Tz) -> Option<GridPlacement> {
    let start = session.start_time.with_timezone(tz);
    let start_hour =
        start.hour() as f64 + start.minute() as f64 / 60.0 + start.second() as f64 / 3600.0;
    let duration_hours = (session.end_time - session.start_time).num_seconds() as f64 / 3600.0;
    let end_hour = start_hour + duration_hours;

    if end_hour <= DAY_START_HOUR || start_hour >= DAY_END_HOUR {
        return None;
    }

    let clipped_start = start_hour.max(DAY_START_HOUR);
    let clipped_end = end_hour.min(DAY_END_HOUR);

    Some(GridPlacement {
        top: (clipped_start - DAY_START_HOUR) * HOUR_ROW_PX,
        height: (clipped_end - clipped_start) * HOUR_ROW_PX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn session(start: DateTime<Utc>, minutes: i64, completed: bool) -> StudySession {
        let mut s = StudySession::new(
            "Session".to_string(),
            start,
            start + Duration::minutes(minutes),
            None,
        );
        s.is_completed = completed;
        s
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_today_includes_last_minute_of_day() {
        // 2025-03-10 is a Monday
        let now = utc(2025, 3, 10, 12, 0, 0);
        let sessions = vec![
            session(utc(2025, 3, 10, 23, 59, 0), 30, false),
            session(utc(2025, 3, 11, 0, 0, 0), 30, false),
        ];

        let today = sessions_today(&sessions, &now);

        assert_eq!(today.len(), 1);
        assert_eq!(today[0].start_time, utc(2025, 3, 10, 23, 59, 0));
    }

    #[test]
    fn test_today_respects_time_zone() {
        // 22:00 UTC on March 9 is 03:00 March 10 at +05:00
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = utc(2025, 3, 10, 6, 0, 0).with_timezone(&tz);
        let sessions = vec![session(utc(2025, 3, 9, 22, 0, 0), 60, false)];

        let today = sessions_today(&sessions, &now);

        assert_eq!(today.len(), 1);
    }

    #[test]
    fn test_upcoming_today_filters_and_sorts() {
        let now = utc(2025, 3, 10, 12, 0, 0);
        let sessions = vec![
            session(utc(2025, 3, 10, 16, 0, 0), 60, false),
            session(utc(2025, 3, 10, 14, 0, 0), 60, false),
            // Already started
            session(utc(2025, 3, 10, 11, 0, 0), 60, false),
            // Completed
            session(utc(2025, 3, 10, 15, 0, 0), 60, true),
        ];

        let upcoming = upcoming_today(&sessions, &now);

        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].start_time, utc(2025, 3, 10, 14, 0, 0));
        assert_eq!(upcoming[1].start_time, utc(2025, 3, 10, 16, 0, 0));
    }

    #[test]
    fn test_next_up_limit() {
        let now = utc(2025, 3, 10, 8, 0, 0);
        let sessions: Vec<StudySession> = (0..5)
            .map(|i| session(utc(2025, 3, 10, 9 + i, 0, 0), 30, false))
            .collect();

        let next = next_up(&sessions, &now);

        assert_eq!(next.len(), NEXT_UP_LIMIT);
        assert_eq!(next[0].start_time, utc(2025, 3, 10, 9, 0, 0));
        assert_eq!(next[2].start_time, utc(2025, 3, 10, 11, 0, 0));
    }

    #[test]
    fn test_week_count_monday_boundary() {
        // Wednesday 2025-03-12; week runs Mon 03-10 .. Sun 03-16
        let now = utc(2025, 3, 12, 12, 0, 0);
        let sessions = vec![
            // Monday 00:00:01 counts
            session(utc(2025, 3, 10, 0, 0, 1), 60, true),
            // Preceding Sunday 23:59:59 does not
            session(utc(2025, 3, 9, 23, 59, 59), 60, true),
            // In-week but not completed
            session(utc(2025, 3, 11, 9, 0, 0), 60, false),
        ];

        assert_eq!(completed_count_this_week(&sessions, &now), 1);
    }

    #[test]
    fn test_week_count_sunday_inclusive() {
        let now = utc(2025, 3, 12, 12, 0, 0);
        let sessions = vec![
            // Sunday 23:59 of the current week
            session(utc(2025, 3, 16, 23, 59, 0), 30, true),
            // Next Monday
            session(utc(2025, 3, 17, 0, 0, 1), 30, true),
        ];

        assert_eq!(completed_count_this_week(&sessions, &now), 1);
    }

    #[test]
    fn test_minute_totals() {
        let now = utc(2025, 3, 10, 12, 0, 0);
        let sessions = vec![
            session(utc(2025, 3, 10, 9, 0, 0), 90, true),
            session(utc(2025, 3, 10, 14, 0, 0), 60, false),
            // Different day, ignored
            session(utc(2025, 3, 11, 9, 0, 0), 120, true),
        ];

        assert_eq!(scheduled_minutes_today(&sessions, &now), 150);
        assert_eq!(completed_minutes_today(&sessions, &now), 90);
    }

    #[test]
    fn test_grid_placement_mid_morning() {
        // 09:30 - 11:00 => top 2.5h * 64, height 1.5h * 64
        let s = session(utc(2025, 3, 10, 9, 30, 0), 90, false);

        let placement = grid_placement(&s, &Utc).expect("placement expected");

        assert_eq!(placement.top, 160.0);
        assert_eq!(placement.height, 96.0);
    }

    #[test]
    fn test_grid_placement_clips_to_window() {
        // 06:00 - 08:00 clips to 07:00 - 08:00
        let early = session(utc(2025, 3, 10, 6, 0, 0), 120, false);
        let placement = grid_placement(&early, &Utc).expect("placement expected");
        assert_eq!(placement.top, 0.0);
        assert_eq!(placement.height, 64.0);

        // 21:30 - 23:00 clips to 21:30 - 22:00
        let late = session(utc(2025, 3, 10, 21, 30, 0), 90, false);
        let placement = grid_placement(&late, &Utc).expect("placement expected");
        assert_eq!(placement.top, (21.5 - 7.0) * 64.0);
        assert_eq!(placement.height, 32.0);
    }

    #[test]
    fn test_grid_placement_outside_window() {
        // Entirely before the window
        let night = session(utc(2025, 3, 10, 4, 0, 0), 120, false);
        assert_eq!(grid_placement(&night, &Utc), None);

        // Entirely after the window
        let midnight = session(utc(2025, 3, 10, 22, 30, 0), 60, false);
        assert_eq!(grid_placement(&midnight, &Utc), None);
    }

    #[test]
    fn test_grid_placement_uses_local_time() {
        // 04:30 UTC is 09:30 at +05:00
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let s = session(utc(2025, 3, 10, 4, 30, 0), 90, false);

        let placement = grid_placement(&s, &tz).expect("placement expected");

        assert_eq!(placement.top, 160.0);
        assert_eq!(placement.height, 96.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn grid_placement_stays_within_window(
                hour in 0u32..24,
                minute in 0u32..60,
                duration in 1i64..600,
            ) {
                let start = utc(2025, 3, 10, hour, minute, 0);
                let s = session(start, duration, false);

                if let Some(placement) = grid_placement(&s, &Utc) {
                    let grid_height = (DAY_END_HOUR - DAY_START_HOUR) * HOUR_ROW_PX;
                    prop_assert!(placement.top >= 0.0);
                    prop_assert!(placement.height > 0.0);
                    prop_assert!(placement.top + placement.height <= grid_height + 1e-9);
                }
            }

            #[test]
            fn next_up_never_exceeds_limit_and_stays_sorted(
                offsets in prop::collection::vec(1i64..720, 0..12),
            ) {
                let now = utc(2025, 3, 10, 0, 0, 0);
                let sessions: Vec<StudySession> = offsets
                    .iter()
                    .map(|m| session(now + Duration::minutes(*m), 30, false))
                    .collect();

                let next = next_up(&sessions, &now);

                prop_assert!(next.len() <= NEXT_UP_LIMIT);
                for pair in next.windows(2) {
                    prop_assert!(pair[0].start_time <= pair[1].start_time);
                }
            }
        }
    }
}
