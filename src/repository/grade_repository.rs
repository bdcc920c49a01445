use crate::error::AcademicError;
use crate::types::{CourseId, Grade, GradeId, UserId};

/// All CRUD operations related to the `Grade` entity.
pub trait GradeRepository {
    /// Inserts the grade and returns the generated id. At most one grade may
    /// exist per (student, course) pair; a duplicate fails with
    /// [`AcademicError::Constraint`].
    fn add_grade(&self, grade: &Grade) -> Result<GradeId, AcademicError>;

    fn find_grade_by_id(&self, id: GradeId) -> Result<Option<Grade>, AcademicError>;

    fn find_grade_for_student_and_course(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Grade>, AcademicError>;

    fn find_grades_by_student(&self, student_id: UserId) -> Result<Vec<Grade>, AcademicError>;
    fn find_grades_by_course(&self, course_id: CourseId) -> Result<Vec<Grade>, AcademicError>;
    fn find_all_grades(&self) -> Result<Vec<Grade>, AcademicError>;

    fn update_grade_value(&self, id: GradeId, value: f64) -> Result<bool, AcademicError>;

    fn delete_grade(&self, id: GradeId) -> Result<bool, AcademicError>;
}
