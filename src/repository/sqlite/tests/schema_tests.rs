use crate::error::AcademicError;
use crate::repository::sqlite::tests::test_database_manager;
use crate::repository::sqlite;
use crate::repository::SharedSqliteConnection;

#[test]
fn test_foreign_keys_enabled() {
    let db_manager = test_database_manager().expect("Failed to create test database manager");

    let foreign_keys_enabled = is_foreign_keys_enabled(&db_manager.get_connection())
        .expect("Failed to check foreign keys setting");

    assert!(foreign_keys_enabled, "Foreign keys should be enabled");
}

#[test]
fn test_schema_creation_is_idempotent() {
    let db_manager = test_database_manager().expect("Failed to create test database manager");

    // Running schema creation a second time against the same connection
    // must be a no-op, as it happens on every startup.
    sqlite::create_schema(&db_manager.get_connection())
        .expect("Re-running schema creation should succeed");
}

#[test]
fn test_all_tables_exist() {
    let db_manager = test_database_manager().expect("Failed to create test database manager");
    let connection = db_manager.get_connection();
    let conn = connection.lock().expect("connection mutex poisoned");

    for table in [
        "users",
        "courses",
        "groups",
        "grades",
        "group_students",
        "group_courses",
    ] {
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .expect("Failed to query sqlite_master");
        assert_eq!(count, 1, "Table {table} should exist");
    }
}

/// Helper function to check if foreign keys are enabled in an SQLite connection
fn is_foreign_keys_enabled(conn: &SharedSqliteConnection) -> Result<bool, AcademicError> {
    let conn = conn.lock().map_err(|_| AcademicError::LockPoisoned)?;
    let mut stmt = conn
        .prepare("PRAGMA foreign_keys")
        .map_err(|e| AcademicError::Sql(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| row.get::<_, i32>(0))
        .map_err(|e| AcademicError::Sql(e.to_string()))?;

    for row in rows {
        return Ok(row.map_err(|e| AcademicError::Sql(e.to_string()))? == 1);
    }

    Ok(false)
}
