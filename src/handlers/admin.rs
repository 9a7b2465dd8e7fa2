// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        course::CreateCourseRequest,
        exam::CreateExamRequest,
        topic::{CreateTopicRequest, UpdateNotesRequest},
    },
    utils::extract::AppJson,
};

/// Maps a foreign-key violation to 404 for the referenced entity.
fn map_insert_error(e: sqlx::Error, what: &str, referenced: &str) -> AppError {
    let is_fk_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23503");

    if is_fk_violation {
        AppError::NotFound(format!("{} not found", referenced))
    } else {
        tracing::error!("Failed to create {}: {:?}", what, e);
        AppError::InternalServerError(e.to_string())
    }
}

/// Creates a course.
/// Admin only.
pub async fn create_course(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO courses (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Creates a topic inside a course.
/// Admin only.
pub async fn create_topic(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO topics (course_id, name, study_notes)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(payload.course_id)
    .bind(&payload.name)
    .bind(&payload.study_notes)
    .fetch_one(&pool)
    .await
    .map_err(|e| map_insert_error(e, "topic", "Course"))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Replaces the study notes of a topic. `null` clears them.
/// Admin only.
pub async fn update_topic_notes(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateNotesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE topics SET study_notes = $1 WHERE id = $2")
        .bind(&payload.study_notes)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update topic notes: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Creates an exam for a course, optionally tied to a topic.
/// Admin only.
pub async fn create_exam(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO exams
        (course_id, topic_id, title, duration_minutes, negative_marking_ratio, total_marks)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(payload.course_id)
    .bind(payload.topic_id)
    .bind(&payload.title)
    .bind(payload.duration_minutes)
    .bind(payload.negative_marking_ratio)
    .bind(payload.total_marks)
    .fetch_one(&pool)
    .await
    .map_err(|e| map_insert_error(e, "exam", "Course or topic"))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}
