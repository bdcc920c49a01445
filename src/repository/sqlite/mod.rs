use crate::error::AcademicError;
use crate::repository::SharedSqliteConnection;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

pub mod sqlite_course_repo;
pub mod sqlite_grade_repo;
pub mod sqlite_group_repo;
pub mod sqlite_user_repo;

#[cfg(test)]
pub(crate) mod tests;

/// Creates the entire database schema by running schema creation functions
/// for all entities. Grades and the link tables reference users, courses and
/// groups, so those three tables are created first.
#[allow(clippy::module_name_repetitions)]
pub(crate) fn create_schema(connection: &SharedSqliteConnection) -> Result<(), AcademicError> {
    {
        let conn = connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        enable_foreign_keys(&conn)?;
    }
    sqlite_user_repo::create_users_table(connection)?;
    sqlite_course_repo::create_courses_table(connection)?;
    sqlite_group_repo::create_groups_table(connection)?;
    sqlite_grade_repo::create_grades_table(connection)?;
    sqlite_group_repo::create_link_tables(connection)?;
    Ok(())
}

/// Opens the database file, creating parent directories as needed.
pub(crate) fn create_connection(dbms_path: &Path) -> Result<Connection, AcademicError> {
    if let Some(parent) = dbms_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let connection =
        Connection::open(dbms_path).map_err(|e| AcademicError::OpenDbms {
            path: dbms_path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
    Ok(connection)
}

/// Foreign key enforcement is off by default in SQLite and every cascade
/// rule in the schema depends on it.
pub(crate) fn enable_foreign_keys(connection: &Connection) -> Result<(), AcademicError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|e| AcademicError::DatabaseError(e.to_string()))
}
