//! Database layer
//!
//! This module provides database abstraction for the study planner.
//! It supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for running against a shared server)
//!
//! The database driver is selected based on configuration. The pool is
//! an explicitly constructed handle with a defined lifecycle: opened at
//! startup, passed into repositories, closed on shutdown.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
