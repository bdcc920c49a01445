use crate::error::AcademicError;
use crate::repository::user_repository::UserRepository;
use crate::repository::SharedSqliteConnection;
use crate::types::{CourseId, Role, User, UserId};
use log::debug;
use rusqlite::{params, Row};
use std::str::FromStr;

pub struct SqliteUserRepository {
    connection: SharedSqliteConnection,
}

impl SqliteUserRepository {
    pub(crate) fn new(connection: SharedSqliteConnection) -> Self {
        Self { connection }
    }
}

/// SQL statement to create the `users` table.
const CREATE_USERS_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id integer primary key autoincrement,
        name varchar(256) not null,
        surname varchar(256) not null,
        username varchar(256) not null unique,
        password_hash varchar(1024) not null,
        role varchar(16) not null
    );
";

/// Creates the `users` table in the database.
pub(crate) fn create_users_table(
    connection: &SharedSqliteConnection,
) -> Result<(), AcademicError> {
    let conn = connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
    conn.execute(CREATE_USERS_TABLE_SQL, [])?;
    Ok(())
}

const USER_COLUMNS: &str = "id, name, surname, username, password_hash, role";

pub(crate) fn map_user_row(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    let role: String = row.get(5)?;
    Ok(User {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        surname: row.get(2)?,
        username: row.get(3)?,
        password_hash: row.get(4)?,
        // An unexpected discriminator means the row was not written by us.
        role: Role::from_str(&role).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
    })
}

impl UserRepository for SqliteUserRepository {
    fn add_user(&self, user: &User) -> Result<UserId, AcademicError> {
        debug!("Inserting user {}", user.username);
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO users (name, surname, username, password_hash, role)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.name,
                user.surname,
                user.username,
                user.password_hash,
                user.role.as_str()
            ],
        )
        .map_err(|e| match AcademicError::from(e) {
            AcademicError::Constraint(_) => AcademicError::Constraint(format!(
                "A user with the username '{}' already exists.",
                user.username
            )),
            other => other,
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
        let user = stmt
            .query_map(params![id], map_user_row)?
            .next()
            .transpose()?;
        Ok(user)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))?;
        let user = stmt
            .query_map(params![username], map_user_row)?
            .next()
            .transpose()?;
        Ok(user)
    }

    fn find_users_by_role(&self, role: Role) -> Result<Vec<User>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE role = ?1"))?;
        let users = stmt
            .query_map(params![role.as_str()], map_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn find_all_users(&self) -> Result<Vec<User>, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users"))?;
        let users = stmt
            .query_map([], map_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn update_user_profile(
        &self,
        id: UserId,
        name: &str,
        surname: &str,
        username: &str,
    ) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let updated = conn
            .execute(
                "UPDATE users SET name = ?1, surname = ?2, username = ?3 WHERE id = ?4",
                params![name, surname, username, id],
            )
            .map_err(|e| match AcademicError::from(e) {
                AcademicError::Constraint(_) => AcademicError::Constraint(format!(
                    "A user with the username '{username}' already exists."
                )),
                other => other,
            })?;
        Ok(updated > 0)
    }

    fn update_user_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, AcademicError> {
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let updated = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;
        Ok(updated > 0)
    }

    fn delete_user(&self, id: UserId) -> Result<bool, AcademicError> {
        debug!("Deleting user {id}");
        let mut conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let tx = conn.transaction()?;

        // Unassigning the lecturer from their courses is a business rule,
        // not orphan cleanup, so it happens here rather than relying on the
        // ON DELETE SET NULL column rule alone.
        tx.execute(
            "UPDATE courses SET lecturer_id = NULL WHERE lecturer_id = ?1",
            params![id],
        )?;
        let deleted = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn find_students_for_course(&self, course_id: CourseId) -> Result<Vec<User>, AcademicError> {
        debug!("Resolving students visible for course {course_id}");
        let conn = self.connection.lock().map_err(|_| AcademicError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT u.id, u.name, u.surname, u.username, u.password_hash, u.role
             FROM users u
             JOIN group_students gs ON gs.student_id = u.id
             JOIN group_courses gc ON gc.group_id = gs.group_id
             WHERE gc.course_id = ?1 AND u.role = 'student'
             ORDER BY u.id",
        )?;
        let students = stmt
            .query_map(params![course_id], map_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sqlite::tests::test_database_manager;

    #[test]
    fn add_and_find_user_round_trip() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        let mut student = User::new_student("Ada", "Lovelace", "ada.lovelace", "hash");
        let id = repo.add_user(&student)?;
        student.id = Some(id);

        let found = repo
            .find_user_by_username("ada.lovelace")?
            .expect("user should exist");
        assert_eq!(found, student);
        assert_eq!(repo.find_user_by_id(id)?, Some(student));
        Ok(())
    }

    #[test]
    fn duplicate_username_is_rejected() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        repo.add_user(&User::new_student("Ada", "Lovelace", "ada.lovelace", "h1"))?;
        let result = repo.add_user(&User::new_lecturer("Adam", "Lovelace", "ada.lovelace", "h2"));

        assert!(matches!(result, Err(AcademicError::Constraint(_))));
        assert_eq!(repo.find_all_users()?.len(), 1);
        Ok(())
    }

    #[test]
    fn find_users_by_role_filters() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        repo.add_user(&User::new_student("Ada", "Lovelace", "ada.lovelace", "h"))?;
        repo.add_user(&User::new_lecturer("Alan", "Turing", "alan.turing", "h"))?;

        let students = repo.find_users_by_role(Role::Student)?;
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].username, "ada.lovelace");
        assert!(repo.find_users_by_role(Role::Admin)?.is_empty());
        Ok(())
    }

    #[test]
    fn update_profile_keeps_role() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        let id = repo.add_user(&User::new_student("Ada", "Lovelace", "ada.lovelace", "h"))?;
        assert!(repo.update_user_profile(id, "Ada", "King", "ada.king")?);

        let updated = repo.find_user_by_id(id)?.expect("user should exist");
        assert_eq!(updated.surname, "King");
        assert_eq!(updated.role, Role::Student);
        Ok(())
    }

    #[test]
    fn update_unknown_id_returns_false() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        assert!(!repo.update_user_password(42, "new-hash")?);
        assert!(!repo.delete_user(42)?);
        Ok(())
    }
}
