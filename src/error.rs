use std::{io, path::PathBuf};

use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum AcademicError {
    #[error("Unable to load the application configuration file {path:?}")]
    ApplicationConfig { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {path}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unable to create configuration file {path}")]
    ConfigFileCreation { path: PathBuf },
    #[error("Unable to open DBMS in file {path}: {reason}")]
    OpenDbms { path: String, reason: String },
    #[error("SQL dbms error: {0}")]
    Sql(String),
    #[error("Constraint violated: {0}")]
    Constraint(String),
    #[error("Unable to create database SQL schema: {0}")]
    DatabaseError(String),
    #[error("Directory creation failed")]
    CreateDir(#[from] io::Error),
    #[error("Unable to hash password: {0}")]
    PasswordHash(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Mutex locking error")]
    LockPoisoned,
}

impl From<rusqlite::Error> for AcademicError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            // Uniqueness and referential-integrity failures are ordinary
            // outcomes for callers, not storage faults.
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AcademicError::Constraint(
                    msg.unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            other => AcademicError::Sql(format!("Sqlite error {other}")),
        }
    }
}
