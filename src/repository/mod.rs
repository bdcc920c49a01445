use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// Repository traits, one per entity collection.
pub mod course_repository;
pub mod grade_repository;
pub mod group_repository;
pub mod user_repository;

// Database-related utilities and managers.
pub mod database_manager;
pub mod sqlite;

/// A thread-safe, shared connection to an ``SQLite`` database,
/// used across the repository instances.
pub(crate) type SharedSqliteConnection = Arc<Mutex<Connection>>;
