//! Course repository
//!
//! Uniqueness of `name` is left to the table constraint; violations come
//! back as [`DbError::Conflict`] rather than a check-then-insert.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::DbError;
use crate::models::{Course, CoursePatch, CourseStatus, NewCourse};

const COURSE_COLUMNS: &str = "id, name, description, duration, status, created_at, updated_at";

/// Course row as stored; status is TEXT
#[derive(Debug, FromRow)]
struct CourseRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    duration: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = DbError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let status = CourseStatus::parse(&row.status)
            .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            duration: row.duration,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Course repository
pub struct CourseRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CourseRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All courses, name ascending in byte order (independent of the database locale).
    pub async fn list(&self) -> Result<Vec<Course>, DbError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"SELECT {COURSE_COLUMNS} FROM courses ORDER BY name COLLATE "C" ASC"#
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Course::try_from).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Course, DbError> {
        let row: CourseRow = sqlx::query_as(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("course", id))?;

        row.try_into()
    }

    pub async fn create(&self, course: &NewCourse) -> Result<Course, DbError> {
        let row: CourseRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO courses (name, description, duration, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(&course.name)
        .bind(course.description.as_deref())
        .bind(course.duration)
        .bind(course.status.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::unique_or_sqlx(e, "course", "name", &course.name))?;

        row.try_into()
    }

    /// Merge `patch` into the course; `updated_at` is always refreshed.
    pub async fn update(&self, id: Uuid, patch: &CoursePatch) -> Result<Course, DbError> {
        let conflict_value = patch.name.clone().unwrap_or_default();

        let row: CourseRow = sqlx::query_as(&format!(
            r#"
            UPDATE courses SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                duration = COALESCE($5, duration),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.duration)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DbError::unique_or_sqlx(e, "course", "name", &conflict_value))?
        .ok_or_else(|| DbError::not_found("course", id))?;

        row.try_into()
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
