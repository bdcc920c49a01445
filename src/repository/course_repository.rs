use crate::error::AcademicError;
use crate::types::{Course, CourseId, UserId};

/// All CRUD operations related to the `Course` entity, plus the
/// role-scoped visibility query used by the student dashboard.
pub trait CourseRepository {
    /// Inserts the course and returns the generated id. Fails with
    /// [`AcademicError::Constraint`] when the name is already taken or the
    /// lecturer id does not reference an existing user.
    fn add_course(&self, course: &Course) -> Result<CourseId, AcademicError>;

    fn find_course_by_id(&self, id: CourseId) -> Result<Option<Course>, AcademicError>;
    fn find_course_by_name(&self, name: &str) -> Result<Option<Course>, AcademicError>;
    fn find_courses_by_lecturer(&self, lecturer_id: UserId)
        -> Result<Vec<Course>, AcademicError>;
    fn find_all_courses(&self) -> Result<Vec<Course>, AcademicError>;

    fn rename_course(&self, id: CourseId, name: &str) -> Result<bool, AcademicError>;

    /// Assigns or, with `None`, unassigns the lecturer.
    fn assign_lecturer(
        &self,
        id: CourseId,
        lecturer_id: Option<UserId>,
    ) -> Result<bool, AcademicError>;

    /// Deletes the course. Grades and group assignments referencing it are
    /// removed by the cascade rules.
    fn delete_course(&self, id: CourseId) -> Result<bool, AcademicError>;

    /// Every course linked to any group the student belongs to.
    /// Recomputed from the link tables on every call.
    fn find_courses_for_student(&self, student_id: UserId)
        -> Result<Vec<Course>, AcademicError>;
}
