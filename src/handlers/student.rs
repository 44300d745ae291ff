//! Student CRUD handlers: create, list, read, update, delete.

use crate::entity::Student;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Body returned by DELETE, whether or not the student existed.
pub const DELETE_MESSAGE: &str = "Student Deleted Successfully";

pub async fn create(
    State(state): State<AppState>,
    Json(student): Json<Student>,
) -> Result<impl IntoResponse, AppError> {
    let saved = state.service.save_student(student).await?;
    tracing::info!(id = ?saved.id, "student created");
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let students = state.service.get_all_students().await?;
    Ok((StatusCode::OK, Json(students)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = state
        .service
        .get_student_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;
    Ok((StatusCode::OK, Json(student)))
}

/// Replaces all fields of an existing student; the path id wins over any id in the body.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(student): Json<Student>,
) -> Result<impl IntoResponse, AppError> {
    if state.service.get_student_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(id.to_string()));
    }
    let updated = state.service.update_student(student.with_id(id)).await?;
    Ok((StatusCode::OK, Json(updated)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.service.delete_student(id).await?;
    Ok((StatusCode::OK, DELETE_MESSAGE))
}
