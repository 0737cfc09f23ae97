//! Study session repository
//!
//! Database operations for study sessions, including the reminder-sweep
//! queries. The reminder flag is flipped with a conditional update so a
//! session can be claimed exactly once even if sweeps overlap.
//!
//! This module provides:
//! - `StudySessionRepository` trait defining the interface for session data access
//! - `SqlxStudySessionRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Resource, ResourceType, SessionWithResource, StudySession};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Study session repository trait
#[async_trait]
pub trait StudySessionRepository: Send + Sync {
    /// Create a new study session
    async fn create(&self, session: &StudySession) -> Result<StudySession>;

    /// Get session by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<StudySession>>;

    /// List all sessions ordered by start time, each with its linked
    /// resource (if any) inlined
    async fn list_with_resources(&self) -> Result<Vec<SessionWithResource>>;

    /// Overwrite a session row. Returns the stored session, or None if
    /// the ID doesn't exist.
    async fn update(&self, session: &StudySession) -> Result<Option<StudySession>>;

    /// Set only the completion flag. Returns the updated session, or
    /// None if the ID doesn't exist.
    async fn set_completed(&self, id: i64, is_completed: bool) -> Result<Option<StudySession>>;

    /// Delete a session. Returns false if the ID doesn't exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Sessions starting within [now, horizon] that are neither
    /// completed nor already reminded, with linked resources inlined.
    async fn due_for_reminder(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<SessionWithResource>>;

    /// Flip reminder_sent false -> true. Returns true only for the call
    /// that actually claimed the transition; repeated calls return false.
    async fn mark_reminder_sent(&self, id: i64) -> Result<bool>;
}

/// SQLx-based study session repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxStudySessionRepository {
    pool: DynDatabasePool,
}

impl SqlxStudySessionRepository {
    /// Create a new SQLx study session repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn StudySessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl StudySessionRepository for SqlxStudySessionRepository {
    async fn create(&self, session: &StudySession) -> Result<StudySession> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_session_sqlite(self.pool.as_sqlite().unwrap(), session).await
            }
            DatabaseDriver::Mysql => {
                create_session_mysql(self.pool.as_mysql().unwrap(), session).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StudySession>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_session_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_session_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_with_resources(&self) -> Result<Vec<SessionWithResource>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_with_resources_sqlite(self.pool.as_sqlite().unwrap()).await
            }
            DatabaseDriver::Mysql => list_with_resources_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, session: &StudySession) -> Result<Option<StudySession>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_session_sqlite(self.pool.as_sqlite().unwrap(), session).await
            }
            DatabaseDriver::Mysql => {
                update_session_mysql(self.pool.as_mysql().unwrap(), session).await
            }
        }
    }

    async fn set_completed(&self, id: i64, is_completed: bool) -> Result<Option<StudySession>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_completed_sqlite(self.pool.as_sqlite().unwrap(), id, is_completed).await
            }
            DatabaseDriver::Mysql => {
                set_completed_mysql(self.pool.as_mysql().unwrap(), id, is_completed).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_session_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_session_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn due_for_reminder(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<SessionWithResource>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                due_for_reminder_sqlite(self.pool.as_sqlite().unwrap(), now, horizon).await
            }
            DatabaseDriver::Mysql => {
                due_for_reminder_mysql(self.pool.as_mysql().unwrap(), now, horizon).await
            }
        }
    }

    async fn mark_reminder_sent(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                mark_reminder_sent_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                mark_reminder_sent_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }
}

const SESSION_WITH_RESOURCE_COLUMNS: &str = r#"
    s.id, s.title, s.start_time, s.end_time, s.is_completed, s.reminder_sent,
    s.resource_id, s.created_at,
    r.id AS r_id, r.title AS r_title, r.kind AS r_kind, r.url AS r_url,
    r.total_units AS r_total_units, r.completed_units AS r_completed_units,
    r.created_at AS r_created_at
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_session_sqlite(pool: &SqlitePool, session: &StudySession) -> Result<StudySession> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO study_sessions
            (title, start_time, end_time, is_completed, reminder_sent, resource_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.title)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.is_completed)
    .bind(session.reminder_sent)
    .bind(session.resource_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create study session")?;

    let id = result.last_insert_rowid();

    Ok(StudySession {
        id,
        title: session.title.clone(),
        start_time: session.start_time,
        end_time: session.end_time,
        is_completed: session.is_completed,
        reminder_sent: session.reminder_sent,
        resource_id: session.resource_id,
        created_at: now,
    })
}

async fn get_session_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<StudySession>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, start_time, end_time, is_completed, reminder_sent,
               resource_id, created_at
        FROM study_sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get study session by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_session_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_with_resources_sqlite(pool: &SqlitePool) -> Result<Vec<SessionWithResource>> {
    let sql = format!(
        r#"
        SELECT {SESSION_WITH_RESOURCE_COLUMNS}
        FROM study_sessions s
        LEFT JOIN resources r ON r.id = s.resource_id
        ORDER BY s.start_time ASC
        "#
    );

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list study sessions")?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row_to_session_with_resource_sqlite(&row)?);
    }

    Ok(sessions)
}

async fn update_session_sqlite(
    pool: &SqlitePool,
    session: &StudySession,
) -> Result<Option<StudySession>> {
    let result = sqlx::query(
        r#"
        UPDATE study_sessions
        SET title = ?, start_time = ?, end_time = ?, is_completed = ?, resource_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&session.title)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.is_completed)
    .bind(session.resource_id)
    .bind(session.id)
    .execute(pool)
    .await
    .context("Failed to update study session")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_session_by_id_sqlite(pool, session.id).await
}

async fn set_completed_sqlite(
    pool: &SqlitePool,
    id: i64,
    is_completed: bool,
) -> Result<Option<StudySession>> {
    let result = sqlx::query("UPDATE study_sessions SET is_completed = ? WHERE id = ?")
        .bind(is_completed)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update session status")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_session_by_id_sqlite(pool, id).await
}

async fn delete_session_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM study_sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete study session")?;

    Ok(result.rows_affected() > 0)
}

async fn due_for_reminder_sqlite(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
) -> Result<Vec<SessionWithResource>> {
    let sql = format!(
        r#"
        SELECT {SESSION_WITH_RESOURCE_COLUMNS}
        FROM study_sessions s
        LEFT JOIN resources r ON r.id = s.resource_id
        WHERE s.start_time >= ? AND s.start_time <= ?
          AND s.reminder_sent = 0 AND s.is_completed = 0
        ORDER BY s.start_time ASC
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(horizon)
        .fetch_all(pool)
        .await
        .context("Failed to query due sessions")?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row_to_session_with_resource_sqlite(&row)?);
    }

    Ok(sessions)
}

async fn mark_reminder_sent_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    // Conditional update: only one caller can win the false -> true
    // transition, and it is never reversed.
    let result = sqlx::query(
        "UPDATE study_sessions SET reminder_sent = 1 WHERE id = ? AND reminder_sent = 0",
    )
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to mark reminder sent")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_session_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<StudySession> {
    Ok(StudySession {
        id: row.get("id"),
        title: row.get("title"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        is_completed: row.get("is_completed"),
        reminder_sent: row.get("reminder_sent"),
        resource_id: row.get("resource_id"),
        created_at: row.get("created_at"),
    })
}

fn row_to_session_with_resource_sqlite(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionWithResource> {
    let resource = match row.get::<Option<i64>, _>("r_id") {
        Some(r_id) => {
            let kind: String = row.get("r_kind");
            let kind = ResourceType::parse(&kind)
                .ok_or_else(|| anyhow::anyhow!("Unknown resource kind in database: {}", kind))?;
            Some(Resource {
                id: r_id,
                title: row.get("r_title"),
                kind,
                url: row.get("r_url"),
                total_units: row.get("r_total_units"),
                completed_units: row.get("r_completed_units"),
                created_at: row.get("r_created_at"),
            })
        }
        None => None,
    };

    Ok(SessionWithResource {
        session: row_to_session_sqlite(row)?,
        resource,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_session_mysql(pool: &MySqlPool, session: &StudySession) -> Result<StudySession> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO study_sessions
            (title, start_time, end_time, is_completed, reminder_sent, resource_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.title)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.is_completed)
    .bind(session.reminder_sent)
    .bind(session.resource_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create study session")?;

    let id = result.last_insert_id() as i64;

    Ok(StudySession {
        id,
        title: session.title.clone(),
        start_time: session.start_time,
        end_time: session.end_time,
        is_completed: session.is_completed,
        reminder_sent: session.reminder_sent,
        resource_id: session.resource_id,
        created_at: now,
    })
}

async fn get_session_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<StudySession>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, start_time, end_time, is_completed, reminder_sent,
               resource_id, created_at
        FROM study_sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get study session by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_session_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_with_resources_mysql(pool: &MySqlPool) -> Result<Vec<SessionWithResource>> {
    let sql = format!(
        r#"
        SELECT {SESSION_WITH_RESOURCE_COLUMNS}
        FROM study_sessions s
        LEFT JOIN resources r ON r.id = s.resource_id
        ORDER BY s.start_time ASC
        "#
    );

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list study sessions")?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row_to_session_with_resource_mysql(&row)?);
    }

    Ok(sessions)
}

async fn update_session_mysql(
    pool: &MySqlPool,
    session: &StudySession,
) -> Result<Option<StudySession>> {
    // rows_affected is 0 both for a missing row and for a no-op write,
    // so existence is checked separately.
    if get_session_by_id_mysql(pool, session.id).await?.is_none() {
        return Ok(None);
    }

    sqlx::query(
        r#"
        UPDATE study_sessions
        SET title = ?, start_time = ?, end_time = ?, is_completed = ?, resource_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&session.title)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.is_completed)
    .bind(session.resource_id)
    .bind(session.id)
    .execute(pool)
    .await
    .context("Failed to update study session")?;

    get_session_by_id_mysql(pool, session.id).await
}

async fn set_completed_mysql(
    pool: &MySqlPool,
    id: i64,
    is_completed: bool,
) -> Result<Option<StudySession>> {
    if get_session_by_id_mysql(pool, id).await?.is_none() {
        return Ok(None);
    }

    sqlx::query("UPDATE study_sessions SET is_completed = ? WHERE id = ?")
        .bind(is_completed)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update session status")?;

    get_session_by_id_mysql(pool, id).await
}

async fn delete_session_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM study_sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete study session")?;

    Ok(result.rows_affected() > 0)
}

async fn due_for_reminder_mysql(
    pool: &MySqlPool,
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
) -> Result<Vec<SessionWithResource>> {
    let sql = format!(
        r#"
        SELECT {SESSION_WITH_RESOURCE_COLUMNS}
        FROM study_sessions s
        LEFT JOIN resources r ON r.id = s.resource_id
        WHERE s.start_time >= ? AND s.start_time <= ?
          AND s.reminder_sent = 0 AND s.is_completed = 0
        ORDER BY s.start_time ASC
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(horizon)
        .fetch_all(pool)
        .await
        .context("Failed to query due sessions")?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row_to_session_with_resource_mysql(&row)?);
    }

    Ok(sessions)
}

async fn mark_reminder_sent_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE study_sessions SET reminder_sent = 1 WHERE id = ? AND reminder_sent = 0",
    )
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to mark reminder sent")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_session_mysql(row: &sqlx::mysql::MySqlRow) -> Result<StudySession> {
    Ok(StudySession {
        id: row.get("id"),
        title: row.get("title"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        is_completed: row.get("is_completed"),
        reminder_sent: row.get("reminder_sent"),
        resource_id: row.get("resource_id"),
        created_at: row.get("created_at"),
    })
}

fn row_to_session_with_resource_mysql(row: &sqlx::mysql::MySqlRow) -> Result<SessionWithResource> {
    let resource = match row.get::<Option<i64>, _>("r_id") {
        Some(r_id) => {
            let kind: String = row.get("r_kind");
            let kind = ResourceType::parse(&kind)
                .ok_or_else(|| anyhow::anyhow!("Unknown resource kind in database: {}", kind))?;
            Some(Resource {
                id: r_id,
                title: row.get("r_title"),
                kind,
                url: row.get("r_url"),
                total_units: row.get("r_total_units"),
                completed_units: row.get("r_completed_units"),
                created_at: row.get("r_created_at"),
            })
        }
        None => None,
    };

    Ok(SessionWithResource {
        session: row_to_session_mysql(row)?,
        resource,
    })
}
