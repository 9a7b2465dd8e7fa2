// src/handlers/catalog.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        course::Course,
        exam::{Exam, ExamListParams},
        question::{PublicOption, PublicQuestion, Question, QuestionOption},
        topic::{Topic, TopicListParams},
    },
};

/// Loads an exam or returns 404.
pub(crate) async fn fetch_exam(pool: &PgPool, id: i64) -> Result<Exam, AppError> {
    sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, course_id, topic_id, title, duration_minutes, negative_marking_ratio, total_marks
        FROM exams
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch exam {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("Exam not found".to_string()))
}

/// Loads a topic or returns 404.
pub(crate) async fn fetch_topic(pool: &PgPool, id: i64) -> Result<Topic, AppError> {
    sqlx::query_as::<_, Topic>(
        "SELECT id, course_id, name, study_notes FROM topics WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Topic not found".to_string()))
}

pub async fn list_courses(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, name, description FROM courses ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

pub async fn get_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT id, name, description FROM courses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

/// Lists topics, optionally filtered by course.
pub async fn list_topics(
    State(pool): State<PgPool>,
    Query(params): Query<TopicListParams>,
) -> Result<impl IntoResponse, AppError> {
    let topics = sqlx::query_as::<_, Topic>(
        r#"
        SELECT id, course_id, name, study_notes
        FROM topics
        WHERE ($1::BIGINT IS NULL OR course_id = $1)
        ORDER BY id
        "#,
    )
    .bind(params.course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(topics))
}

pub async fn get_topic(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(fetch_topic(&pool, id).await?))
}

/// Lists exams, optionally filtered by course and topic.
pub async fn list_exams(
    State(pool): State<PgPool>,
    Query(params): Query<ExamListParams>,
) -> Result<impl IntoResponse, AppError> {
    let exams = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, course_id, topic_id, title, duration_minutes, negative_marking_ratio, total_marks
        FROM exams
        WHERE ($1::BIGINT IS NULL OR course_id = $1)
          AND ($2::BIGINT IS NULL OR topic_id = $2)
        ORDER BY id
        "#,
    )
    .bind(params.course_id)
    .bind(params.topic_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(exams))
}

pub async fn get_exam(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(fetch_exam(&pool, id).await?))
}

/// Returns the exam's questions with their options in stored order.
/// Correctness flags are not included.
pub async fn get_exam_questions(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, id).await?;

    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, exam_id, text_content, marks FROM questions WHERE exam_id = $1 ORDER BY id",
    )
    .bind(exam.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch questions for exam {}: {:?}", exam.id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();

    let options = sqlx::query_as::<_, QuestionOption>(
        r#"
        SELECT id, question_id, text, is_correct, position
        FROM options
        WHERE question_id = ANY($1)
        ORDER BY question_id, position, id
        "#,
    )
    .bind(&question_ids)
    .fetch_all(&pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<PublicOption>> = HashMap::new();
    for option in options {
        by_question
            .entry(option.question_id)
            .or_default()
            .push(PublicOption {
                id: option.id,
                text: option.text,
            });
    }

    let paper: Vec<PublicQuestion> = questions
        .into_iter()
        .map(|q| PublicQuestion {
            options: by_question.remove(&q.id).unwrap_or_default(),
            id: q.id,
            text_content: q.text_content,
            marks: q.marks,
        })
        .collect();

    Ok(Json(paper))
}
