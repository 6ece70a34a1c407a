//! Student endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use super::DeleteResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{CreateStudent, NewStudent, Student, StudentPatch, UpdateStudent};

/// GET /api/students - newest first
async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.store.list_students().await?;
    Ok(Json(students))
}

/// GET /api/students/{id}
async fn get_student(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Student>, ApiError> {
    let student = state.store.get_student(id).await?;
    Ok(Json(student))
}

/// POST /api/students - `enrollmentDate` defaults to now
async fn create_student(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateStudent>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = NewStudent::try_from(req)?;
    let student = state.store.create_student(student).await?;
    tracing::info!(student_id = %student.id, "Student created");

    Ok((StatusCode::CREATED, Json(student)))
}

/// PUT /api/students/{id}
async fn update_student(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<UpdateStudent>,
) -> Result<Json<Student>, ApiError> {
    let patch = StudentPatch::try_from(req)?;
    let student = state.store.update_student(id, patch).await?;
    Ok(Json(student))
}

/// DELETE /api/students/{id}
async fn delete_student(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.store.delete_student(id).await?;
    tracing::info!(student_id = %id, removed, "Student delete");

    Ok(Json(DeleteResponse {
        message: "Student deleted",
    }))
}

/// Student routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}
