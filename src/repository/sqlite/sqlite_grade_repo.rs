use crate::error::AcademicError;
use crate::repository::grade_repository::GradeRepository;
use crate::repository::SharedSqliteConnection;
use crate::types::{CourseId, Grade, GradeId, UserId};
use log::debug;
use rusqlite::{params, Row};

pub struct SqliteGradeRepository {
    connection: SharedSqliteConnection,
}

impl SqliteGradeRepository {
    pub(crate) fn new(connection: SharedSqliteConnection) -> Self {
        Self { connection }
    }
}

const CREATE_GRADES_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS grades (
        id integer primary key autoincrement,
        student_id integer not null,
        course_id integer not null,
        value real not null,
        FOREIGN KEY (student_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
        UNIQUE (student_id, course_id)
    );
";

pub(crate) fn create_grades_table(
    connection: &SharedSqliteConnection,
) -> Result<(), AcademicError> {
    let conn = connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
    conn.execute(CREATE_GRADES_TABLE_SQL, [])?;
    Ok(())
}

fn map_grade_row(row: &Row<'_>) -> Result<Grade, rusqlite::Error> {
    Ok(Grade {
        id: Some(row.get(0)?),
        student_id: row.get(1)?,
        course_id: row.get(2)?,
        value: row.get(3)?,
    })
}

impl GradeRepository for SqliteGradeRepository {
    fn add_grade(&self, grade: &Grade) -> Result<GradeId, AcademicError> {
        debug!(
            "Inserting grade for student {} in course {}",
            grade.student_id, grade.course_id
        );
        if self
            .find_grade_for_student_and_course(grade.student_id, grade.course_id)?
            .is_some()
        {
            return Err(AcademicError::Constraint(
                "A grade for this student in this course already exists.".to_string(),
            ));
        }

        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO grades (student_id, course_id, value) VALUES (?1, ?2, ?3)",
            params![grade.student_id, grade.course_id, grade.value],
        )
        .map_err(|e| match AcademicError::from(e) {
            AcademicError::Constraint(_) => AcademicError::Constraint(
                "A grade for this student in this course already exists.".to_string(),
            ),
            other => other,
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn find_grade_by_id(&self, id: GradeId) -> Result<Option<Grade>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn
            .prepare("SELECT id, student_id, course_id, value FROM grades WHERE id = ?1")?;
        let grade = stmt
            .query_map(params![id], map_grade_row)?
            .next()
            .transpose()?;
        Ok(grade)
    }

    fn find_grade_for_student_and_course(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Grade>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, value FROM grades
             WHERE student_id = ?1 AND course_id = ?2",
        )?;
        let grade = stmt
            .query_map(params![student_id, course_id], map_grade_row)?
            .next()
            .transpose()?;
        Ok(grade)
    }

    fn find_grades_by_student(&self, student_id: UserId) -> Result<Vec<Grade>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, value FROM grades WHERE student_id = ?1",
        )?;
        let grades = stmt
            .query_map(params![student_id], map_grade_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grades)
    }

    fn find_grades_by_course(&self, course_id: CourseId) -> Result<Vec<Grade>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, value FROM grades WHERE course_id = ?1",
        )?;
        let grades = stmt
            .query_map(params![course_id], map_grade_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grades)
    }

    fn find_all_grades(&self) -> Result<Vec<Grade>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT id, student_id, course_id, value FROM grades")?;
        let grades = stmt
            .query_map([], map_grade_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grades)
    }

    fn update_grade_value(&self, id: GradeId, value: f64) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let updated = conn.execute(
            "UPDATE grades SET value = ?1 WHERE id = ?2",
            params![value, id],
        )?;
        Ok(updated > 0)
    }

    fn delete_grade(&self, id: GradeId) -> Result<bool, AcademicError> {
        debug!("Deleting grade {id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let deleted = conn.execute("DELETE FROM grades WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::course_repository::CourseRepository;
    use crate::repository::sqlite::tests::test_database_manager;
    use crate::repository::user_repository::UserRepository;
    use crate::types::{Course, User};

    fn student_and_course(
        db_manager: &crate::repository::database_manager::DatabaseManager,
    ) -> Result<(UserId, CourseId), AcademicError> {
        let users = db_manager.create_user_repository();
        let courses = db_manager.create_course_repository();
        let student_id =
            users.add_user(&User::new_student("Ada", "Lovelace", "ada.lovelace", "h"))?;
        let course_id = courses.add_course(&Course::new("Calculus", None))?;
        Ok((student_id, course_id))
    }

    #[test]
    fn add_and_find_grade() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let grades = db_manager.create_grade_repository();
        let (student_id, course_id) = student_and_course(&db_manager)?;

        let id = grades.add_grade(&Grade::new(student_id, course_id, 87.5))?;
        let found = grades
            .find_grade_for_student_and_course(student_id, course_id)?
            .expect("grade should exist");
        assert_eq!(found.id, Some(id));
        assert!((found.value - 87.5).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn one_grade_per_student_per_course() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let grades = db_manager.create_grade_repository();
        let (student_id, course_id) = student_and_course(&db_manager)?;

        grades.add_grade(&Grade::new(student_id, course_id, 60.0))?;
        let second = grades.add_grade(&Grade::new(student_id, course_id, 70.0));

        assert!(matches!(second, Err(AcademicError::Constraint(_))));
        assert_eq!(grades.find_grades_by_student(student_id)?.len(), 1);
        Ok(())
    }

    #[test]
    fn grade_requires_existing_student_and_course() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let grades = db_manager.create_grade_repository();

        let result = grades.add_grade(&Grade::new(1, 1, 50.0));
        assert!(matches!(result, Err(AcademicError::Constraint(_))));
        Ok(())
    }

    #[test]
    fn update_grade_value_in_place() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let grades = db_manager.create_grade_repository();
        let (student_id, course_id) = student_and_course(&db_manager)?;

        let id = grades.add_grade(&Grade::new(student_id, course_id, 60.0))?;
        assert!(grades.update_grade_value(id, 95.0)?);

        let updated = grades.find_grade_by_id(id)?.expect("grade should exist");
        assert!((updated.value - 95.0).abs() < f64::EPSILON);
        assert!(!grades.update_grade_value(999, 10.0)?);
        Ok(())
    }
}
