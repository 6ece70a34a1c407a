//! In-memory store with the same constraints as the Postgres schema
//!
//! Used by router tests; enforces unique course names and student emails,
//! and the same list orderings.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DbError, Store};
use crate::models::{
    Course, CoursePatch, CourseStatus, DashboardStats, NewCourse, NewStudent, Student,
    StudentPatch, StudentStatus,
};

#[derive(Default)]
struct Tables {
    courses: HashMap<Uuid, Course>,
    /// Insertion sequence breaks `created_at` ties
    students: HashMap<Uuid, (u64, Student)>,
    next_seq: u64,
}

/// In-memory [`Store`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose connection attempt failed; every operation errors.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            tables: RwLock::default(),
            unavailable: Some(reason.into()),
        }
    }

    fn check(&self) -> Result<(), DbError> {
        match &self.unavailable {
            Some(reason) => Err(DbError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ensure_ready(&self) -> Result<(), DbError> {
        self.check()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DbError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables.courses.values().cloned().collect();
        // Byte order, matching `COLLATE "C"` in CourseRepo::list
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn get_course(&self, id: Uuid) -> Result<Course, DbError> {
        self.check()?;
        let tables = self.tables.read().await;
        tables
            .courses
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("course", id))
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, DbError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.courses.values().any(|c| c.name == course.name) {
            return Err(DbError::Conflict {
                resource: "course",
                field: "name",
                value: course.name,
            });
        }

        let now = Utc::now();
        let record = Course {
            id: Uuid::new_v4(),
            name: course.name,
            description: course.description,
            duration: course.duration,
            status: course.status,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> Result<Course, DbError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if let Some(name) = &patch.name {
            if tables.courses.values().any(|c| c.id != id && &c.name == name) {
                return Err(DbError::Conflict {
                    resource: "course",
                    field: "name",
                    value: name.clone(),
                });
            }
        }

        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("course", id))?;
        patch.apply(course);
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, DbError> {
        self.check()?;
        Ok(self.tables.write().await.courses.remove(&id).is_some())
    }

    async fn list_students(&self) -> Result<Vec<Student>, DbError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut students: Vec<&(u64, Student)> = tables.students.values().collect();
        students.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(students.into_iter().map(|(_, s)| s.clone()).collect())
    }

    async fn get_student(&self, id: Uuid) -> Result<Student, DbError> {
        self.check()?;
        let tables = self.tables.read().await;
        tables
            .students
            .get(&id)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| DbError::not_found("student", id))
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, DbError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let email = student.email.into_string();
        if tables.students.values().any(|(_, s)| s.email == email) {
            return Err(DbError::Conflict {
                resource: "student",
                field: "email",
                value: email,
            });
        }

        let now = Utc::now();
        let record = Student {
            id: Uuid::new_v4(),
            name: student.name,
            email,
            course: student.course,
            enrollment_date: student.enrollment_date.unwrap_or(now),
            status: student.status,
            created_at: now,
            updated_at: now,
        };
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.students.insert(record.id, (seq, record.clone()));
        Ok(record)
    }

    async fn update_student(&self, id: Uuid, patch: StudentPatch) -> Result<Student, DbError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            let taken = tables
                .students
                .values()
                .any(|(_, s)| s.id != id && s.email == email.as_str());
            if taken {
                return Err(DbError::Conflict {
                    resource: "student",
                    field: "email",
                    value: email.as_str().to_owned(),
                });
            }
        }

        let (_, student) = tables
            .students
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("student", id))?;
        patch.apply(student);
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn delete_student(&self, id: Uuid) -> Result<bool, DbError> {
        self.check()?;
        Ok(self.tables.write().await.students.remove(&id).is_some())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, DbError> {
        self.check()?;
        let tables = self.tables.read().await;
        let count_students = |status: StudentStatus| {
            tables.students.values().filter(|(_, s)| s.status == status).count() as i64
        };

        Ok(DashboardStats {
            total_students: tables.students.len() as i64,
            active_students: count_students(StudentStatus::Active),
            graduated_students: count_students(StudentStatus::Graduated),
            total_courses: tables.courses.len() as i64,
            active_courses: tables
                .courses
                .values()
                .filter(|c| c.status == CourseStatus::Active)
                .count() as i64,
        })
    }
}
