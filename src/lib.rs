//! Core of the academic records system: typed entities, the SQLite-backed
//! repositories that enforce the relational constraints, credential handling
//! and the administrator bootstrap. Presentation shells (terminal menus,
//! desktop forms) sit on top of [`ApplicationRuntime`] and never touch the
//! storage directly.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::BootstrapAdmin;
use crate::error::AcademicError;
use crate::repository::database_manager::{DatabaseConfig, DatabaseManager};
use crate::repository::sqlite::sqlite_course_repo::SqliteCourseRepository;
use crate::repository::sqlite::sqlite_grade_repo::SqliteGradeRepository;
use crate::repository::sqlite::sqlite_group_repo::SqliteGroupRepository;
use crate::repository::sqlite::sqlite_user_repo::SqliteUserRepository;
use crate::types::{Role, User};

pub mod auth;
pub mod config;
pub mod error;
pub mod repository;
pub mod types;

/// Owns the database manager and one shared instance of every repository.
/// Presentation shells construct this once at startup via the builder and
/// pass it (together with a [`Session`]) through their call graph.
pub struct ApplicationRuntime {
    #[allow(dead_code)]
    config: config::AppConfiguration,
    database_manager: DatabaseManager,
    users: Arc<SqliteUserRepository>,
    courses: Arc<SqliteCourseRepository>,
    groups: Arc<SqliteGroupRepository>,
    grades: Arc<SqliteGradeRepository>,
}

impl ApplicationRuntime {
    #[must_use]
    pub fn user_repository(&self) -> Arc<SqliteUserRepository> {
        self.users.clone()
    }

    #[must_use]
    pub fn course_repository(&self) -> Arc<SqliteCourseRepository> {
        self.courses.clone()
    }

    #[must_use]
    pub fn group_repository(&self) -> Arc<SqliteGroupRepository> {
        self.groups.clone()
    }

    #[must_use]
    pub fn grade_repository(&self) -> Arc<SqliteGradeRepository> {
        self.grades.clone()
    }

    #[must_use]
    pub fn database_manager(&self) -> &DatabaseManager {
        &self.database_manager
    }

    /// Verifies the credentials and opens a session for the user.
    ///
    /// # Errors
    /// [`AcademicError::InvalidCredentials`] for an unknown username or a
    /// wrong password.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AcademicError> {
        let user = auth::authenticate(self.users.as_ref(), username, password)?;
        Ok(Session::new(user))
    }

    /// Ensures an administrator account exists, creating the bootstrap one
    /// if necessary. Invoked once at process start, before any other
    /// operation.
    ///
    /// # Errors
    /// Propagates repository errors from the lookup or the insert.
    pub fn seed_initial_admin(&self) -> Result<Option<BootstrapAdmin>, AcademicError> {
        auth::seed_initial_admin(self.users.as_ref())
    }
}

/// Builder for [`ApplicationRuntime`]. Defaults to the database file named
/// in the configuration; tests use `use_in_memory_db()`.
#[derive(Default)]
pub struct ApplicationRuntimeBuilder {
    in_memory: bool,
    database_path: Option<PathBuf>,
}

impl ApplicationRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn use_in_memory_db(mut self) -> Self {
        self.in_memory = true;
        self
    }

    #[must_use]
    pub fn use_database_file(mut self, path: PathBuf) -> Self {
        self.database_path = Some(path);
        self
    }

    /// # Errors
    /// Returns an error when the configuration cannot be read or the
    /// database cannot be opened.
    pub fn build(self) -> Result<ApplicationRuntime, AcademicError> {
        let config = config::load()?;

        let database_config = if self.in_memory {
            DatabaseConfig::SqliteInMemory
        } else {
            let path = self
                .database_path
                .unwrap_or_else(|| PathBuf::from(&config.application_data.database_file));
            DatabaseConfig::SqliteOnDisk { path }
        };

        let database_manager = DatabaseManager::new(&database_config)?;
        let users = database_manager.create_user_repository();
        let courses = database_manager.create_course_repository();
        let groups = database_manager.create_group_repository();
        let grades = database_manager.create_grade_repository();

        Ok(ApplicationRuntime {
            config,
            database_manager,
            users,
            courses,
            groups,
            grades,
        })
    }
}

/// The logged-in user, passed explicitly through presentation-layer calls
/// instead of being held in process-wide state.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    #[must_use]
    pub fn new(user: User) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.user.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    #[must_use]
    pub fn is_lecturer(&self) -> bool {
        self.user.role == Role::Lecturer
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.user.role == Role::Student
    }
}
