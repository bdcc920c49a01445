use crate::error::AcademicError;
use crate::repository::group_repository::GroupRepository;
use crate::repository::SharedSqliteConnection;
use crate::types::{CourseId, Group, GroupId, UserId};
use log::debug;
use rusqlite::{params, Row};

pub struct SqliteGroupRepository {
    connection: SharedSqliteConnection,
}

impl SqliteGroupRepository {
    pub(crate) fn new(connection: SharedSqliteConnection) -> Self {
        Self { connection }
    }
}

const CREATE_GROUPS_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS groups (
        id integer primary key autoincrement,
        name varchar(256) not null unique
    );
";

pub(crate) fn create_groups_table(
    connection: &SharedSqliteConnection,
) -> Result<(), AcademicError> {
    let conn = connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
    conn.execute(CREATE_GROUPS_TABLE_SQL, [])?;
    Ok(())
}

/// Association between groups and students.
const CREATE_GROUP_STUDENTS_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS group_students (
        group_id integer not null,
        student_id integer not null,
        PRIMARY KEY (group_id, student_id),
        FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE,
        FOREIGN KEY (student_id) REFERENCES users(id) ON DELETE CASCADE
    );
";

/// Association between groups and courses.
const CREATE_GROUP_COURSES_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS group_courses (
        group_id integer not null,
        course_id integer not null,
        PRIMARY KEY (group_id, course_id),
        FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE,
        FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
    );
";

/// Creates the two many-to-many link tables. Must run after the groups,
/// users and courses tables exist.
pub(crate) fn create_link_tables(
    connection: &SharedSqliteConnection,
) -> Result<(), AcademicError> {
    let conn = connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
    conn.execute(CREATE_GROUP_STUDENTS_TABLE_SQL, [])?;
    conn.execute(CREATE_GROUP_COURSES_TABLE_SQL, [])?;
    Ok(())
}

fn map_group_row(row: &Row<'_>) -> Result<Group, rusqlite::Error> {
    Ok(Group {
        id: Some(row.get(0)?),
        name: row.get(1)?,
    })
}

impl GroupRepository for SqliteGroupRepository {
    fn add_group(&self, group: &Group) -> Result<GroupId, AcademicError> {
        debug!("Inserting group {}", group.name);
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        conn.execute("INSERT INTO groups (name) VALUES (?1)", params![group.name])
            .map_err(|e| match AcademicError::from(e) {
                AcademicError::Constraint(_) => AcademicError::Constraint(format!(
                    "A group named '{}' already exists.",
                    group.name
                )),
                other => other,
            })?;
        Ok(conn.last_insert_rowid())
    }

    fn find_group_by_id(&self, id: GroupId) -> Result<Option<Group>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT id, name FROM groups WHERE id = ?1")?;
        let group = stmt
            .query_map(params![id], map_group_row)?
            .next()
            .transpose()?;
        Ok(group)
    }

    fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT id, name FROM groups WHERE name = ?1")?;
        let group = stmt
            .query_map(params![name], map_group_row)?
            .next()
            .transpose()?;
        Ok(group)
    }

    fn find_all_groups(&self) -> Result<Vec<Group>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT id, name FROM groups")?;
        let groups = stmt
            .query_map([], map_group_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    fn rename_group(&self, id: GroupId, name: &str) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let updated = conn
            .execute("UPDATE groups SET name = ?1 WHERE id = ?2", params![name, id])
            .map_err(|e| match AcademicError::from(e) {
                AcademicError::Constraint(_) => {
                    AcademicError::Constraint(format!("A group named '{name}' already exists."))
                }
                other => other,
            })?;
        Ok(updated > 0)
    }

    fn delete_group(&self, id: GroupId) -> Result<bool, AcademicError> {
        debug!("Deleting group {id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let deleted = conn.execute("DELETE FROM groups WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn add_student_to_group(
        &self,
        group_id: GroupId,
        student_id: UserId,
    ) -> Result<(), AcademicError> {
        debug!("Adding student {student_id} to group {group_id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO group_students (group_id, student_id) VALUES (?1, ?2)",
            params![group_id, student_id],
        )
        .map_err(|e| match AcademicError::from(e) {
            AcademicError::Constraint(_) => {
                AcademicError::Constraint("Student is already in this group.".to_string())
            }
            other => other,
        })?;
        Ok(())
    }

    fn remove_student_from_group(
        &self,
        group_id: GroupId,
        student_id: UserId,
    ) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let removed = conn.execute(
            "DELETE FROM group_students WHERE group_id = ?1 AND student_id = ?2",
            params![group_id, student_id],
        )?;
        Ok(removed > 0)
    }

    fn add_course_to_group(
        &self,
        group_id: GroupId,
        course_id: CourseId,
    ) -> Result<(), AcademicError> {
        debug!("Adding course {course_id} to group {group_id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO group_courses (group_id, course_id) VALUES (?1, ?2)",
            params![group_id, course_id],
        )
        .map_err(|e| match AcademicError::from(e) {
            AcademicError::Constraint(_) => {
                AcademicError::Constraint("Course is already assigned to this group.".to_string())
            }
            other => other,
        })?;
        Ok(())
    }

    fn remove_course_from_group(
        &self,
        group_id: GroupId,
        course_id: CourseId,
    ) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let removed = conn.execute(
            "DELETE FROM group_courses WHERE group_id = ?1 AND course_id = ?2",
            params![group_id, course_id],
        )?;
        Ok(removed > 0)
    }

    fn find_student_ids(&self, group_id: GroupId) -> Result<Vec<UserId>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare("SELECT student_id FROM group_students WHERE group_id = ?1")?;
        let ids = stmt
            .query_map(params![group_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn find_course_ids(&self, group_id: GroupId) -> Result<Vec<CourseId>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare("SELECT course_id FROM group_courses WHERE group_id = ?1")?;
        let ids = stmt
            .query_map(params![group_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn find_groups_for_student(&self, student_id: UserId) -> Result<Vec<Group>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT g.id, g.name
             FROM groups g
             JOIN group_students gs ON gs.group_id = g.id
             WHERE gs.student_id = ?1
             ORDER BY g.id",
        )?;
        let groups = stmt
            .query_map(params![student_id], map_group_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    fn find_groups_for_course(&self, course_id: CourseId) -> Result<Vec<Group>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT g.id, g.name
             FROM groups g
             JOIN group_courses gc ON gc.group_id = g.id
             WHERE gc.course_id = ?1
             ORDER BY g.id",
        )?;
        let groups = stmt
            .query_map(params![course_id], map_group_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::course_repository::CourseRepository;
    use crate::repository::sqlite::tests::test_database_manager;
    use crate::repository::user_repository::UserRepository;
    use crate::types::{Course, User};

    #[test]
    fn duplicate_group_name_is_rejected() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_group_repository();

        repo.add_group(&Group::new("G1"))?;
        assert!(matches!(
            repo.add_group(&Group::new("G1")),
            Err(AcademicError::Constraint(_))
        ));
        Ok(())
    }

    #[test]
    fn enrolling_twice_fails_and_relink_succeeds() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let users = db_manager.create_user_repository();
        let groups = db_manager.create_group_repository();

        let student_id =
            users.add_user(&User::new_student("Ada", "Lovelace", "ada.lovelace", "h"))?;
        let group_id = groups.add_group(&Group::new("G1"))?;

        groups.add_student_to_group(group_id, student_id)?;
        let second = groups.add_student_to_group(group_id, student_id);
        assert!(matches!(second, Err(AcademicError::Constraint(_))));

        assert!(groups.remove_student_from_group(group_id, student_id)?);
        groups.add_student_to_group(group_id, student_id)?;
        assert_eq!(groups.find_student_ids(group_id)?, vec![student_id]);
        Ok(())
    }

    #[test]
    fn unlink_without_link_returns_false() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let groups = db_manager.create_group_repository();

        let group_id = groups.add_group(&Group::new("G1"))?;
        assert!(!groups.remove_student_from_group(group_id, 42)?);
        assert!(!groups.remove_course_from_group(group_id, 42)?);
        Ok(())
    }

    #[test]
    fn course_assignment_is_unique_per_group() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let courses = db_manager.create_course_repository();
        let groups = db_manager.create_group_repository();

        let course_id = courses.add_course(&Course::new("Calculus", None))?;
        let group_id = groups.add_group(&Group::new("G1"))?;

        groups.add_course_to_group(group_id, course_id)?;
        assert!(matches!(
            groups.add_course_to_group(group_id, course_id),
            Err(AcademicError::Constraint(_))
        ));
        assert_eq!(groups.find_course_ids(group_id)?, vec![course_id]);
        Ok(())
    }

    #[test]
    fn linking_unknown_ids_is_rejected() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let groups = db_manager.create_group_repository();

        let group_id = groups.add_group(&Group::new("G1"))?;
        assert!(matches!(
            groups.add_student_to_group(group_id, 999),
            Err(AcademicError::Constraint(_))
        ));
        Ok(())
    }
}
