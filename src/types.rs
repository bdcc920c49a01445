use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type CourseId = i64;
pub type GroupId = i64;
pub type GradeId = i64;

/// Stored role discriminator for a `User`. The role is fixed when the
/// account is created; no update operation touches it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lecturer,
    Student,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Lecturer => "lecturer",
            Role::Student => "student",
        }
    }

    /// Human readable label shown by the presentation shells.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Lecturer => "Lecturer",
            Role::Student => "Student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "lecturer" => Ok(Role::Lecturer),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user account. `id` is `None` until the row has been inserted and the
/// repository has handed back the generated id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn new_admin(name: &str, surname: &str, username: &str, password_hash: &str) -> Self {
        Self::new(name, surname, username, password_hash, Role::Admin)
    }

    #[must_use]
    pub fn new_lecturer(name: &str, surname: &str, username: &str, password_hash: &str) -> Self {
        Self::new(name, surname, username, password_hash, Role::Lecturer)
    }

    #[must_use]
    pub fn new_student(name: &str, surname: &str, username: &str, password_hash: &str) -> Self {
        Self::new(name, surname, username, password_hash, Role::Student)
    }

    fn new(name: &str, surname: &str, username: &str, password_hash: &str, role: Role) -> Self {
        User {
            id: None,
            name: name.to_string(),
            surname: surname.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    #[must_use]
    pub fn role_label(&self) -> &'static str {
        self.role.label()
    }
}

/// A course, optionally taught by a lecturer. An unassigned lecturer is
/// `None`, never a sentinel id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Course {
    pub id: Option<CourseId>,
    pub name: String,
    pub lecturer_id: Option<UserId>,
}

impl Course {
    #[must_use]
    pub fn new(name: &str, lecturer_id: Option<UserId>) -> Self {
        Course {
            id: None,
            name: name.to_string(),
            lecturer_id,
        }
    }
}

/// A student group. Membership and course assignments live in the link
/// tables and are resolved through the group repository.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Group {
    pub id: Option<GroupId>,
    pub name: String,
}

impl Group {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Group {
            id: None,
            name: name.to_string(),
        }
    }
}

/// A grade for one student in one course. At most one grade may exist per
/// (student, course) pair.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Grade {
    pub id: Option<GradeId>,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub value: f64,
}

impl Grade {
    #[must_use]
    pub fn new(student_id: UserId, course_id: CourseId, value: f64) -> Self {
        Grade {
            id: None,
            student_id,
            course_id,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_and_role_label() {
        let user = User::new_student("Ada", "Lovelace", "ada.lovelace", "hash");
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.role_label(), "Student");
        assert_eq!(user.id, None);
    }

    #[test]
    fn role_round_trips_through_discriminator() {
        for role in [Role::Admin, Role::Lecturer, Role::Student] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("professor".parse::<Role>().is_err());
    }
}
