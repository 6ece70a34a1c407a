//! Persistence seam used by the HTTP layer

use async_trait::async_trait;
use uuid::Uuid;

use super::connection::{ConnectionManager, ConnectionState, PgConnector};
use super::repos::{CourseRepo, StatsRepo, StudentRepo};
use super::DbError;
use crate::models::{
    Course, CoursePatch, DashboardStats, NewCourse, NewStudent, Student, StudentPatch,
};

/// One persistence operation per route handler
#[async_trait]
pub trait Store: Send + Sync {
    /// Make sure the backing connection is usable.
    async fn ensure_ready(&self) -> Result<(), DbError>;

    async fn list_courses(&self) -> Result<Vec<Course>, DbError>;
    async fn get_course(&self, id: Uuid) -> Result<Course, DbError>;
    async fn create_course(&self, course: NewCourse) -> Result<Course, DbError>;
    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> Result<Course, DbError>;
    /// Returns whether a record was removed.
    async fn delete_course(&self, id: Uuid) -> Result<bool, DbError>;

    async fn list_students(&self) -> Result<Vec<Student>, DbError>;
    async fn get_student(&self, id: Uuid) -> Result<Student, DbError>;
    async fn create_student(&self, student: NewStudent) -> Result<Student, DbError>;
    async fn update_student(&self, id: Uuid, patch: StudentPatch) -> Result<Student, DbError>;
    /// Returns whether a record was removed.
    async fn delete_student(&self, id: Uuid) -> Result<bool, DbError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, DbError>;
}

/// Postgres-backed store over a lazily connected pool
pub struct PgStore {
    conn: ConnectionManager<PgConnector>,
}

impl PgStore {
    pub fn new(connector: PgConnector) -> Self {
        Self {
            conn: ConnectionManager::new(connector),
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.conn.state()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_ready(&self) -> Result<(), DbError> {
        self.conn.ensure_connected().await.map(|_| ())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DbError> {
        let pool = self.conn.ensure_connected().await?;
        CourseRepo::new(pool).list().await
    }

    async fn get_course(&self, id: Uuid) -> Result<Course, DbError> {
        let pool = self.conn.ensure_connected().await?;
        CourseRepo::new(pool).get(id).await
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, DbError> {
        let pool = self.conn.ensure_connected().await?;
        CourseRepo::new(pool).create(&course).await
    }

    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> Result<Course, DbError> {
        let pool = self.conn.ensure_connected().await?;
        CourseRepo::new(pool).update(id, &patch).await
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, DbError> {
        let pool = self.conn.ensure_connected().await?;
        CourseRepo::new(pool).delete(id).await
    }

    async fn list_students(&self) -> Result<Vec<Student>, DbError> {
        let pool = self.conn.ensure_connected().await?;
        StudentRepo::new(pool).list().await
    }

    async fn get_student(&self, id: Uuid) -> Result<Student, DbError> {
        let pool = self.conn.ensure_connected().await?;
        StudentRepo::new(pool).get(id).await
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, DbError> {
        let pool = self.conn.ensure_connected().await?;
        StudentRepo::new(pool).create(&student).await
    }

    async fn update_student(&self, id: Uuid, patch: StudentPatch) -> Result<Student, DbError> {
        let pool = self.conn.ensure_connected().await?;
        StudentRepo::new(pool).update(id, &patch).await
    }

    async fn delete_student(&self, id: Uuid) -> Result<bool, DbError> {
        let pool = self.conn.ensure_connected().await?;
        StudentRepo::new(pool).delete(id).await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, DbError> {
        let pool = self.conn.ensure_connected().await?;
        StatsRepo::new(pool).dashboard().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pg_store_connects_lazily() {
        // Nothing is dialed until the first operation.
        let store = PgStore::new(PgConnector::new("postgres://127.0.0.1:1/none", 1));
        assert_eq!(store.connection_state(), ConnectionState::Uninitialized);
    }
}
