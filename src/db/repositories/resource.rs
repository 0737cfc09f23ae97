//! Resource repository
//!
//! Database operations for learning resources.
//!
//! This module provides:
//! - `ResourceRepository` trait defining the interface for resource data access
//! - `SqlxResourceRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Resource, ResourceType, ResourceWithSessionCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Resource repository trait
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Create a new resource
    async fn create(&self, resource: &Resource) -> Result<Resource>;

    /// Get resource by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Resource>>;

    /// List all resources ordered by title, each with its linked-session count
    async fn list_with_session_counts(&self) -> Result<Vec<ResourceWithSessionCount>>;

    /// Overwrite the completed-units counter.
    /// Returns the updated resource, or None if the ID doesn't exist.
    async fn update_progress(&self, id: i64, completed_units: i64) -> Result<Option<Resource>>;

    /// Delete a resource. Returns false if the ID doesn't exist.
    /// Sessions referencing the resource keep existing with the link cleared.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based resource repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxResourceRepository {
    pool: DynDatabasePool,
}

impl SqlxResourceRepository {
    /// Create a new SQLx resource repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ResourceRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ResourceRepository for SqlxResourceRepository {
    async fn create(&self, resource: &Resource) -> Result<Resource> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_resource_sqlite(self.pool.as_sqlite().unwrap(), resource).await
            }
            DatabaseDriver::Mysql => {
                create_resource_mysql(self.pool.as_mysql().unwrap(), resource).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Resource>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_resource_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_resource_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_with_session_counts(&self) -> Result<Vec<ResourceWithSessionCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_with_session_counts_sqlite(self.pool.as_sqlite().unwrap()).await
            }
            DatabaseDriver::Mysql => {
                list_with_session_counts_mysql(self.pool.as_mysql().unwrap()).await
            }
        }
    }

    async fn update_progress(&self, id: i64, completed_units: i64) -> Result<Option<Resource>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_progress_sqlite(self.pool.as_sqlite().unwrap(), id, completed_units).await
            }
            DatabaseDriver::Mysql => {
                update_progress_mysql(self.pool.as_mysql().unwrap(), id, completed_units).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_resource_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_resource_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_resource_sqlite(pool: &SqlitePool, resource: &Resource) -> Result<Resource> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO resources (title, kind, url, total_units, completed_units, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&resource.title)
    .bind(resource.kind.as_str())
    .bind(&resource.url)
    .bind(resource.total_units)
    .bind(resource.completed_units)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create resource")?;

    let id = result.last_insert_rowid();

    Ok(Resource {
        id,
        title: resource.title.clone(),
        kind: resource.kind,
        url: resource.url.clone(),
        total_units: resource.total_units,
        completed_units: resource.completed_units,
        created_at: now,
    })
}

async fn get_resource_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Resource>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, kind, url, total_units, completed_units, created_at
        FROM resources
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get resource by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_resource_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_with_session_counts_sqlite(
    pool: &SqlitePool,
) -> Result<Vec<ResourceWithSessionCount>> {
    let rows = sqlx::query(
        r#"
        SELECT r.id, r.title, r.kind, r.url, r.total_units, r.completed_units, r.created_at,
               COUNT(s.id) AS session_count
        FROM resources r
        LEFT JOIN study_sessions s ON s.resource_id = r.id
        GROUP BY r.id
        ORDER BY r.title ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list resources")?;

    let mut resources = Vec::new();
    for row in rows {
        resources.push(ResourceWithSessionCount {
            resource: row_to_resource_sqlite(&row)?,
            session_count: row.get("session_count"),
        });
    }

    Ok(resources)
}

async fn update_progress_sqlite(
    pool: &SqlitePool,
    id: i64,
    completed_units: i64,
) -> Result<Option<Resource>> {
    let result = sqlx::query("UPDATE resources SET completed_units = ? WHERE id = ?")
        .bind(completed_units)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update resource progress")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_resource_by_id_sqlite(pool, id).await
}

async fn delete_resource_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM resources WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete resource")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_resource_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Resource> {
    let kind: String = row.get("kind");
    let kind = ResourceType::parse(&kind)
        .ok_or_else(|| anyhow::anyhow!("Unknown resource kind in database: {}", kind))?;

    Ok(Resource {
        id: row.get("id"),
        title: row.get("title"),
        kind,
        url: row.get("url"),
        total_units: row.get("total_units"),
        completed_units: row.get("completed_units"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_resource_mysql(pool: &MySqlPool, resource: &Resource) -> Result<Resource> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO resources (title, kind, url, total_units, completed_units, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&resource.title)
    .bind(resource.kind.as_str())
    .bind(&resource.url)
    .bind(resource.total_units)
    .bind(resource.completed_units)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create resource")?;

    let id = result.last_insert_id() as i64;

    Ok(Resource {
        id,
        title: resource.title.clone(),
        kind: resource.kind,
        url: resource.url.clone(),
        total_units: resource.total_units,
        completed_units: resource.completed_units,
        created_at: now,
    })
}

async fn get_resource_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Resource>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, kind, url, total_units, completed_units, created_at
        FROM resources
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get resource by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_resource_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_with_session_counts_mysql(
    pool: &MySqlPool,
) -> Result<Vec<ResourceWithSessionCount>> {
    let rows = sqlx::query(
        r#"
        SELECT r.id, r.title, r.kind, r.url, r.total_units, r.completed_units, r.created_at,
               COUNT(s.id) AS session_count
        FROM resources r
        LEFT JOIN study_sessions s ON s.resource_id = r.id
        GROUP BY r.id
        ORDER BY r.title ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list resources")?;

    let mut resources = Vec::new();
    for row in rows {
        resources.push(ResourceWithSessionCount {
            resource: row_to_resource_mysql(&row)?,
            session_count: row.get("session_count"),
        });
    }

    Ok(resources)
}

async fn update_progress_mysql(
    pool: &MySqlPool,
    id: i64,
    completed_units: i64,
) -> Result<Option<Resource>> {
    let result = sqlx::query("UPDATE resources SET completed_units = ? WHERE id = ?")
        .bind(completed_units)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update resource progress")?;

    if result.rows_affected() == 0 {
        // MySQL also reports 0 when the value didn't change; distinguish
        // a missing row from an unchanged one.
        return match get_resource_by_id_mysql(pool, id).await? {
            Some(resource) => Ok(Some(resource)),
            None => Ok(None),
        };
    }

    get_resource_by_id_mysql(pool, id).await
}

async fn delete_resource_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM resources WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete resource")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_resource_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Resource> {
    let kind: String = row.get("kind");
    let kind = ResourceType::parse(&kind)
        .ok_or_else(|| anyhow::anyhow!("Unknown resource kind in database: {}", kind))?;

    Ok(Resource {
        id: row.get("id"),
        title: row.get("title"),
        kind,
        url: row.get("url"),
        total_units: row.get("total_units"),
        completed_units: row.get("completed_units"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxStudySessionRepository, StudySessionRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxResourceRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxResourceRepository::new(pool.clone());
        (pool, repo)
    }

    fn book(title: &str, total_units: Option<i64>) -> Resource {
        Resource::new(title.to_string(), ResourceType::Book, None, total_units)
    }

    #[tokio::test]
    async fn test_create_resource() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&book("Clean Code", Some(17)))
            .await
            .expect("Failed to create resource");

        assert!(created.id > 0);
        assert_eq!(created.title, "Clean Code");
        assert_eq!(created.kind, ResourceType::Book);
        assert_eq!(created.total_units, Some(17));
        assert_eq!(created.completed_units, 0);
    }

    #[tokio::test]
    async fn test_get_resource_by_id() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&book("SICP", None))
            .await
            .expect("Failed to create resource");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get resource")
            .expect("Resource not found");

        assert_eq!(found.id, created.id);
        assert_eq!(found.title, "SICP");
        assert_eq!(found.total_units, None);
    }

    #[tokio::test]
    async fn test_get_resource_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id(99999).await.expect("Failed to get resource");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_title_with_counts() {
        let (pool, repo) = setup_test_repo().await;

        let rust_book = repo
            .create(&book("The Rust Book", None))
            .await
            .expect("Failed to create resource");
        repo.create(&book("Algorithms", Some(20)))
            .await
            .expect("Failed to create resource");

        // Two sessions link to "The Rust Book"
        let session_repo =
            SqlxStudySessionRepository::new(pool.clone());
        for i in 0..2 {
            let start = Utc::now() + chrono::Duration::hours(i);
            let end = start + chrono::Duration::hours(1);
            session_repo
                .create(&crate::models::StudySession::new(
                    format!("Session {}", i),
                    start,
                    end,
                    Some(rust_book.id),
                ))
                .await
                .expect("Failed to create session");
        }

        let resources = repo
            .list_with_session_counts()
            .await
            .expect("Failed to list resources");

        assert_eq!(resources.len(), 2);
        // Title ascending
        assert_eq!(resources[0].resource.title, "Algorithms");
        assert_eq!(resources[0].session_count, 0);
        assert_eq!(resources[1].resource.title, "The Rust Book");
        assert_eq!(resources[1].session_count, 2);
    }

    #[tokio::test]
    async fn test_update_progress() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&book("Clean Code", Some(17)))
            .await
            .expect("Failed to create resource");

        let updated = repo
            .update_progress(created.id, 5)
            .await
            .expect("Failed to update progress")
            .expect("Resource not found");

        assert_eq!(updated.completed_units, 5);
    }

    #[tokio::test]
    async fn test_update_progress_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let updated = repo
            .update_progress(12345, 5)
            .await
            .expect("Failed to update progress");

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_resource() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&book("Delete Me", None))
            .await
            .expect("Failed to create resource");

        let deleted = repo.delete(created.id).await.expect("Failed to delete");
        assert!(deleted);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get resource");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_resource_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let deleted = repo.delete(99999).await.expect("Failed to delete");
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_nullifies_session_links() {
        let (pool, repo) = setup_test_repo().await;
        let resource = repo
            .create(&book("Linked", None))
            .await
            .expect("Failed to create resource");

        let session_repo =
            SqlxStudySessionRepository::new(pool.clone());
        let start = Utc::now();
        let session = session_repo
            .create(&crate::models::StudySession::new(
                "Linked session".to_string(),
                start,
                start + chrono::Duration::hours(1),
                Some(resource.id),
            ))
            .await
            .expect("Failed to create session");

        repo.delete(resource.id).await.expect("Failed to delete");

        // The session survives with its resource link cleared
        let survivor = session_repo
            .get_by_id(session.id)
            .await
            .expect("Failed to get session")
            .expect("Session should survive resource deletion");
        assert_eq!(survivor.resource_id, None);
    }
}
