use crate::error::AcademicError;
use crate::types::{CourseId, Group, GroupId, UserId};

/// All CRUD operations related to the `Group` entity, including the two
/// many-to-many associations kept in the link tables.
pub trait GroupRepository {
    /// Inserts the group and returns the generated id. Fails with
    /// [`AcademicError::Constraint`] when the name is already taken.
    fn add_group(&self, group: &Group) -> Result<GroupId, AcademicError>;

    fn find_group_by_id(&self, id: GroupId) -> Result<Option<Group>, AcademicError>;
    fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, AcademicError>;
    fn find_all_groups(&self) -> Result<Vec<Group>, AcademicError>;

    fn rename_group(&self, id: GroupId, name: &str) -> Result<bool, AcademicError>;

    /// Deletes the group and, through the cascade rules, its membership and
    /// course-assignment links.
    fn delete_group(&self, id: GroupId) -> Result<bool, AcademicError>;

    /// Enrolls a student in a group. Enrolling twice fails with
    /// [`AcademicError::Constraint`] rather than silently succeeding.
    fn add_student_to_group(
        &self,
        group_id: GroupId,
        student_id: UserId,
    ) -> Result<(), AcademicError>;

    /// Returns `true` iff a membership link was actually removed.
    fn remove_student_from_group(
        &self,
        group_id: GroupId,
        student_id: UserId,
    ) -> Result<bool, AcademicError>;

    fn add_course_to_group(
        &self,
        group_id: GroupId,
        course_id: CourseId,
    ) -> Result<(), AcademicError>;

    fn remove_course_from_group(
        &self,
        group_id: GroupId,
        course_id: CourseId,
    ) -> Result<bool, AcademicError>;

    /// Ids of the students enrolled in the group.
    fn find_student_ids(&self, group_id: GroupId) -> Result<Vec<UserId>, AcademicError>;

    /// Ids of the courses assigned to the group.
    fn find_course_ids(&self, group_id: GroupId) -> Result<Vec<CourseId>, AcademicError>;

    fn find_groups_for_student(&self, student_id: UserId) -> Result<Vec<Group>, AcademicError>;
    fn find_groups_for_course(&self, course_id: CourseId) -> Result<Vec<Group>, AcademicError>;
}
