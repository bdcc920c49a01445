use crate::error::AcademicError;
use crate::repository::course_repository::CourseRepository;
use crate::repository::SharedSqliteConnection;
use crate::types::{Course, CourseId, UserId};
use log::debug;
use rusqlite::{params, Row};

pub struct SqliteCourseRepository {
    connection: SharedSqliteConnection,
}

impl SqliteCourseRepository {
    pub(crate) fn new(connection: SharedSqliteConnection) -> Self {
        Self { connection }
    }
}

/// SQL statement to create the `courses` table. A deleted lecturer leaves
/// the course behind with no lecturer assigned.
const CREATE_COURSES_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS courses (
        id integer primary key autoincrement,
        name varchar(256) not null unique,
        lecturer_id integer,
        FOREIGN KEY (lecturer_id) REFERENCES users(id) ON DELETE SET NULL
    );
";

pub(crate) fn create_courses_table(
    connection: &SharedSqliteConnection,
) -> Result<(), AcademicError> {
    let conn = connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
    conn.execute(CREATE_COURSES_TABLE_SQL, [])?;
    Ok(())
}

fn map_course_row(row: &Row<'_>) -> Result<Course, rusqlite::Error> {
    Ok(Course {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        lecturer_id: row.get(2)?,
    })
}

impl CourseRepository for SqliteCourseRepository {
    fn add_course(&self, course: &Course) -> Result<CourseId, AcademicError> {
        debug!("Inserting course {}", course.name);
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO courses (name, lecturer_id) VALUES (?1, ?2)",
            params![course.name, course.lecturer_id],
        )
        .map_err(|e| match AcademicError::from(e) {
            AcademicError::Constraint(_) => AcademicError::Constraint(format!(
                "A course named '{}' already exists or the lecturer is unknown.",
                course.name
            )),
            other => other,
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn find_course_by_id(&self, id: CourseId) -> Result<Option<Course>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare("SELECT id, name, lecturer_id FROM courses WHERE id = ?1")?;
        let course = stmt
            .query_map(params![id], map_course_row)?
            .next()
            .transpose()?;
        Ok(course)
    }

    fn find_course_by_name(&self, name: &str) -> Result<Option<Course>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare("SELECT id, name, lecturer_id FROM courses WHERE name = ?1")?;
        let course = stmt
            .query_map(params![name], map_course_row)?
            .next()
            .transpose()?;
        Ok(course)
    }

    fn find_courses_by_lecturer(
        &self,
        lecturer_id: UserId,
    ) -> Result<Vec<Course>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare("SELECT id, name, lecturer_id FROM courses WHERE lecturer_id = ?1")?;
        let courses = stmt
            .query_map(params![lecturer_id], map_course_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    fn find_all_courses(&self) -> Result<Vec<Course>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT id, name, lecturer_id FROM courses")?;
        let courses = stmt
            .query_map([], map_course_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    fn rename_course(&self, id: CourseId, name: &str) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let updated = conn
            .execute(
                "UPDATE courses SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(|e| match AcademicError::from(e) {
                AcademicError::Constraint(_) => AcademicError::Constraint(format!(
                    "A course named '{name}' already exists."
                )),
                other => other,
            })?;
        Ok(updated > 0)
    }

    fn assign_lecturer(
        &self,
        id: CourseId,
        lecturer_id: Option<UserId>,
    ) -> Result<bool, AcademicError> {
        debug!("Assigning lecturer {lecturer_id:?} to course {id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let updated = conn.execute(
            "UPDATE courses SET lecturer_id = ?1 WHERE id = ?2",
            params![lecturer_id, id],
        )?;
        Ok(updated > 0)
    }

    fn delete_course(&self, id: CourseId) -> Result<bool, AcademicError> {
        debug!("Deleting course {id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let deleted = conn.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn find_courses_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<Course>, AcademicError> {
        debug!("Resolving courses visible for student {student_id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT c.id, c.name, c.lecturer_id
             FROM courses c
             JOIN group_courses gc ON gc.course_id = c.id
             JOIN group_students gs ON gs.group_id = gc.group_id
             WHERE gs.student_id = ?1
             ORDER BY c.id",
        )?;
        let courses = stmt
            .query_map(params![student_id], map_course_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }
}
