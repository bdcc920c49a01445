mod schema_tests;

use crate::error::AcademicError;
use crate::repository::database_manager::{DatabaseConfig, DatabaseManager};

/// Creates a `DatabaseManager` with an in-memory database suitable for testing.
pub fn test_database_manager() -> Result<DatabaseManager, AcademicError> {
    let _ = env_logger::builder().is_test(true).try_init();
    DatabaseManager::new(&DatabaseConfig::SqliteInMemory)
}
