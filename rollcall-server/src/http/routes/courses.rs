//! Course endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use super::DeleteResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Course, CoursePatch, CreateCourse, NewCourse, UpdateCourse};

/// GET /api/courses - all courses, name ascending
async fn list_courses(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = state.store.list_courses().await?;
    Ok(Json(courses))
}

/// GET /api/courses/{id}
async fn get_course(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Course>, ApiError> {
    let course = state.store.get_course(id).await?;
    Ok(Json(course))
}

/// POST /api/courses
async fn create_course(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCourse>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let course = NewCourse::try_from(req)?;
    let course = state.store.create_course(course).await?;
    tracing::info!(course_id = %course.id, name = %course.name, "Course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// PUT /api/courses/{id} - merge provided fields
async fn update_course(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<UpdateCourse>,
) -> Result<Json<Course>, ApiError> {
    let patch = CoursePatch::try_from(req)?;
    let course = state.store.update_course(id, patch).await?;
    Ok(Json(course))
}

/// DELETE /api/courses/{id} - succeeds whether or not the course existed
async fn delete_course(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.store.delete_course(id).await?;
    tracing::info!(course_id = %id, removed, "Course delete");

    Ok(Json(DeleteResponse {
        message: "Course deleted",
    }))
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route(
            "/api/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}
