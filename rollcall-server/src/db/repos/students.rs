//! Student repository
//!
//! Email uniqueness is enforced by the table constraint. Listing is newest
//! first, with `id` breaking ties between rows created in the same instant.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::DbError;
use crate::models::{NewStudent, Student, StudentPatch, StudentStatus};

const STUDENT_COLUMNS: &str =
    "id, name, email, course, enrollment_date, status, created_at, updated_at";

/// Student row as stored; status is TEXT
#[derive(Debug, FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    email: String,
    course: Option<String>,
    enrollment_date: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for Student {
    type Error = DbError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let status = StudentStatus::parse(&row.status)
            .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            course: row.course,
            enrollment_date: row.enrollment_date,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Student repository
pub struct StudentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All students, newest first.
    pub async fn list(&self) -> Result<Vec<Student>, DbError> {
        let rows: Vec<StudentRow> = sqlx::query_as(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Student::try_from).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Student, DbError> {
        let row: StudentRow = sqlx::query_as(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("student", id))?;

        row.try_into()
    }

    /// Insert a student; a missing enrollment date becomes the insert time.
    pub async fn create(&self, student: &NewStudent) -> Result<Student, DbError> {
        let row: StudentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO students (name, email, course, enrollment_date, status)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(&student.name)
        .bind(student.email.as_str())
        .bind(student.course.as_deref())
        .bind(student.enrollment_date)
        .bind(student.status.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::unique_or_sqlx(e, "student", "email", student.email.as_str()))?;

        row.try_into()
    }

    pub async fn update(&self, id: Uuid, patch: &StudentPatch) -> Result<Student, DbError> {
        let conflict_value = patch
            .email
            .as_ref()
            .map(|e| e.as_str().to_owned())
            .unwrap_or_default();

        let row: StudentRow = sqlx::query_as(&format!(
            r#"
            UPDATE students SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                course = CASE WHEN $4 THEN $5 ELSE course END,
                enrollment_date = COALESCE($6, enrollment_date),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.email.as_ref().map(|e| e.as_str()))
        .bind(patch.course.is_some())
        .bind(patch.course.clone().flatten())
        .bind(patch.enrollment_date)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DbError::unique_or_sqlx(e, "student", "email", &conflict_value))?
        .ok_or_else(|| DbError::not_found("student", id))?;

        row.try_into()
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ConnectionManager, PgConnector};
    use crate::models::Email;

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let manager = ConnectionManager::new(PgConnector::new(url, 2));
        manager.ensure_connected().await.expect("connect failed").clone()
    }

    fn new_student(email: &str) -> NewStudent {
        NewStudent {
            name: "Ada".into(),
            email: Email::new(email).unwrap(),
            course: Some("Maths".into()),
            enrollment_date: None,
            status: StudentStatus::Active,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn enrollment_date_defaults_to_creation() {
        let pool = pool().await;
        let repo = StudentRepo::new(&pool);
        let email = format!("{}@example.org", Uuid::new_v4());

        let created = repo.create(&new_student(&email)).await.unwrap();
        assert_eq!(created.enrollment_date, created.created_at);

        let err = repo.create(&new_student(&email)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { field: "email", .. }));

        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_missing_student_is_not_found() {
        let pool = pool().await;
        let err = StudentRepo::new(&pool)
            .update(Uuid::new_v4(), &StudentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "student", .. }));
    }
}
