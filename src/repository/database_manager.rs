use crate::error::AcademicError;
use crate::repository::sqlite;
use crate::repository::sqlite::sqlite_course_repo::SqliteCourseRepository;
use crate::repository::sqlite::sqlite_grade_repo::SqliteGradeRepository;
use crate::repository::sqlite::sqlite_group_repo::SqliteGroupRepository;
use crate::repository::sqlite::sqlite_user_repo::SqliteUserRepository;
use crate::repository::SharedSqliteConnection;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Represents parameters for initializing the database connection
pub enum DatabaseConfig {
    /// SQLite database with a specific file path
    SqliteOnDisk { path: PathBuf },

    /// SQLite database that runs entirely in memory
    SqliteInMemory,
}

pub struct DatabaseManager {
    connection: SharedSqliteConnection,
}

impl DatabaseManager {
    /// Creates a new `DatabaseManager` based on the provided configuration.
    ///
    /// Opens the connection, enables foreign key enforcement and creates the
    /// schema. Schema creation is idempotent, so this is safe to invoke on
    /// every startup.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or the schema
    /// cannot be created.
    pub fn new(config: &DatabaseConfig) -> Result<Self, AcademicError> {
        let connection = match config {
            DatabaseConfig::SqliteOnDisk { path } => sqlite::create_connection(path)?,
            DatabaseConfig::SqliteInMemory => Connection::open_in_memory().map_err(|e| {
                AcademicError::OpenDbms {
                    path: ":memory:".to_string(),
                    reason: e.to_string(),
                }
            })?,
        };

        let connection = Arc::new(Mutex::new(connection));
        sqlite::create_schema(&connection)?;

        Ok(Self { connection })
    }

    /// Provide access to the shared database connection.
    pub(crate) fn get_connection(&self) -> SharedSqliteConnection {
        self.connection.clone()
    }

    #[must_use]
    pub fn create_user_repository(&self) -> Arc<SqliteUserRepository> {
        Arc::new(SqliteUserRepository::new(self.get_connection()))
    }

    #[must_use]
    pub fn create_course_repository(&self) -> Arc<SqliteCourseRepository> {
        Arc::new(SqliteCourseRepository::new(self.get_connection()))
    }

    #[must_use]
    pub fn create_group_repository(&self) -> Arc<SqliteGroupRepository> {
        Arc::new(SqliteGroupRepository::new(self.get_connection()))
    }

    #[must_use]
    pub fn create_grade_repository(&self) -> Arc<SqliteGradeRepository> {
        Arc::new(SqliteGradeRepository::new(self.get_connection()))
    }
}
