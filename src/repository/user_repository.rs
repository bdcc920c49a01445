use crate::error::AcademicError;
use crate::types::{CourseId, Role, User, UserId};

/// All CRUD operations related to the `User` entity, plus the
/// role-scoped visibility query used by the lecturer dashboard.
pub trait UserRepository {
    /// Inserts the user and returns the generated id. Fails with
    /// [`AcademicError::Constraint`] when the username is already taken.
    fn add_user(&self, user: &User) -> Result<UserId, AcademicError>;

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AcademicError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AcademicError>;
    fn find_users_by_role(&self, role: Role) -> Result<Vec<User>, AcademicError>;
    fn find_all_users(&self) -> Result<Vec<User>, AcademicError>;

    /// Updates name, surname and username. The role is immutable once the
    /// account exists. Returns `false` for an unknown id.
    fn update_user_profile(
        &self,
        id: UserId,
        name: &str,
        surname: &str,
        username: &str,
    ) -> Result<bool, AcademicError>;

    fn update_user_password(&self, id: UserId, password_hash: &str)
        -> Result<bool, AcademicError>;

    /// Deletes the user. Courses taught by the user are unassigned
    /// (lecturer set to null) in the same transaction; the user's grades and
    /// group memberships are removed by the cascade rules.
    fn delete_user(&self, id: UserId) -> Result<bool, AcademicError>;

    /// Every student enrolled in any group the course is assigned to.
    /// Recomputed from the link tables on every call.
    fn find_students_for_course(&self, course_id: CourseId) -> Result<Vec<User>, AcademicError>;
}
