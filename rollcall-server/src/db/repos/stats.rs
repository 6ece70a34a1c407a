//! Dashboard counts, computed in a single round trip

use sqlx::{PgPool, Row};

use crate::db::DbError;
use crate::models::DashboardStats;

/// Stats repository
pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM students WHERE status = 'active') AS active_students,
                (SELECT COUNT(*) FROM students WHERE status = 'graduated') AS graduated_students,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM courses WHERE status = 'active') AS active_courses
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            total_students: row.try_get("total_students")?,
            active_students: row.try_get("active_students")?,
            graduated_students: row.try_get("graduated_students")?,
            total_courses: row.try_get("total_courses")?,
            active_courses: row.try_get("active_courses")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{CourseRepo, StudentRepo};
    use crate::db::{ConnectionManager, PgConnector};
    use crate::models::{CourseStatus, Email, NewCourse, NewStudent, StudentStatus};
    use uuid::Uuid;

    // Other tests share the database; assert on deltas with lower bounds.

    #[tokio::test]
    #[ignore = "requires database"]
    async fn dashboard_counts_by_status() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let manager = ConnectionManager::new(PgConnector::new(url, 2));
        let pool = manager.ensure_connected().await.expect("connect failed");
        let stats = StatsRepo::new(pool);

        let before = stats.dashboard().await.unwrap();

        let course = CourseRepo::new(pool)
            .create(&NewCourse {
                name: format!("course-{}", Uuid::new_v4()),
                description: None,
                duration: 4,
                status: CourseStatus::Active,
            })
            .await
            .unwrap();
        let student = StudentRepo::new(pool)
            .create(&NewStudent {
                name: "Grace".into(),
                email: Email::new(&format!("{}@example.org", Uuid::new_v4())).unwrap(),
                course: Some(course.name.clone()),
                enrollment_date: None,
                status: StudentStatus::Graduated,
            })
            .await
            .unwrap();

        let after = stats.dashboard().await.unwrap();
        assert!(after.total_courses >= before.total_courses + 1);
        assert!(after.active_courses >= 1);
        assert!(after.total_students >= before.total_students + 1);
        assert!(after.graduated_students >= 1);
        assert!(after.active_students + after.graduated_students <= after.total_students);
        assert!(after.active_courses <= after.total_courses);

        StudentRepo::new(pool).delete(student.id).await.unwrap();
        CourseRepo::new(pool).delete(course.id).await.unwrap();
    }
}
