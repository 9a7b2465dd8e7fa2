// src/handlers/ai_generator.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    generator::{GenerationRequest, PromptMode, QuestionGenerator},
    handlers::catalog::{fetch_exam, fetch_topic},
    models::{
        generation::{BulkSaveRequest, GenerateRequest, ImageGenerateRequest, SubjectTestRequest},
        question::check_batch,
        topic::Topic,
    },
    utils::extract::AppJson,
};

/// Generates questions from a topic's study notes.
/// Admin only. Topics without notes are rejected before the model is called.
pub async fn generate(
    State(pool): State<PgPool>,
    State(generator): State<Arc<QuestionGenerator>>,
    AppJson(payload): AppJson<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let topic = fetch_topic(&pool, payload.topic_id).await?;
    let notes = topic.usable_notes().ok_or(AppError::BadRequest(
        "This topic has no notes to generate from.".to_string(),
    ))?;

    let questions = generator
        .generate(GenerationRequest {
            mode: PromptMode::TextOnly,
            source_text: notes.to_string(),
            num_questions: payload.num_questions,
            difficulty: payload.difficulty,
            custom_instructions: payload.custom_instructions.unwrap_or_default(),
            image_base64: None,
            on_failure: payload.on_failure,
        })
        .await;

    Ok(Json(questions))
}

/// Joins the notes of several topics under a heading per topic.
/// Topics without notes are left out.
fn combine_notes(topics: &[Topic]) -> String {
    topics
        .iter()
        .filter_map(|t| t.usable_notes().map(|notes| format!("## {}\n{}", t.name, notes)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Generates a subject test from the notes of every topic in a course.
/// Admin only.
pub async fn generate_subject_test(
    State(pool): State<PgPool>,
    State(generator): State<Arc<QuestionGenerator>>,
    AppJson(payload): AppJson<SubjectTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let course_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;
    if course_exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, course_id, name, study_notes FROM topics WHERE course_id = $1 ORDER BY id",
    )
    .bind(payload.course_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch topics for course {}: {:?}", payload.course_id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    let combined = combine_notes(&topics);
    if combined.is_empty() {
        return Err(AppError::BadRequest(
            "This course has no notes to generate from.".to_string(),
        ));
    }

    let questions = generator
        .generate(GenerationRequest {
            mode: PromptMode::Combined,
            source_text: combined,
            num_questions: payload.num_questions,
            difficulty: payload.difficulty,
            custom_instructions: payload.custom_instructions.unwrap_or_default(),
            image_base64: None,
            on_failure: payload.on_failure,
        })
        .await;

    Ok(Json(questions))
}

/// Generates questions from an uploaded image, optionally with a topic's notes.
/// Admin only. An undecodable image is handled like any other generation failure.
pub async fn generate_from_image(
    State(pool): State<PgPool>,
    State(generator): State<Arc<QuestionGenerator>>,
    AppJson(payload): AppJson<ImageGenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let notes = match payload.topic_id {
        Some(topic_id) => fetch_topic(&pool, topic_id)
            .await?
            .usable_notes()
            .map(str::to_string)
            .unwrap_or_default(),
        None => String::new(),
    };

    let questions = generator
        .generate(GenerationRequest {
            mode: PromptMode::Combined,
            source_text: notes,
            num_questions: payload.num_questions,
            difficulty: payload.difficulty,
            custom_instructions: payload.custom_instructions.unwrap_or_default(),
            image_base64: Some(payload.image),
            on_failure: payload.on_failure,
        })
        .await;

    Ok(Json(questions))
}

/// Saves generated questions into an exam and optionally updates its duration.
/// Admin only.
///
/// * Every item must have 4 options and a `correct_index` in 0..=3; otherwise nothing is saved.
/// * All rows are written in one transaction.
pub async fn save_bulk(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<BulkSaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    check_batch(&payload.questions).map_err(AppError::BadRequest)?;

    let exam = fetch_exam(&pool, payload.exam_id).await?;
    let new_duration = payload.new_duration();

    let mut tx = pool.begin().await?;

    if let Some(minutes) = new_duration {
        sqlx::query("UPDATE exams SET duration_minutes = $1 WHERE id = $2")
            .bind(minutes)
            .bind(exam.id)
            .execute(&mut *tx)
            .await?;
    }

    for item in &payload.questions {
        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (exam_id, text_content, marks) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(exam.id)
        .bind(&item.question_text)
        .bind(item.marks)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        let correct = item.correct_position();
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO options (question_id, text, is_correct, position) ");
        builder.push_values(item.options.iter().enumerate(), |mut row, (idx, text)| {
            row.push_bind(question_id)
                .push_bind(text.as_str())
                .push_bind(idx == correct)
                .push_bind(idx as i32);
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(
        exam_id = exam.id,
        added = payload.questions.len(),
        duration_updated = new_duration.is_some(),
        "Bulk import finished"
    );

    Ok(Json(json!({
        "status": "success",
        "added": payload.questions.len(),
        "duration_updated": new_duration.is_some(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: i64, name: &str, notes: Option<&str>) -> Topic {
        Topic {
            id,
            course_id: 1,
            name: name.to_string(),
            study_notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn combined_notes_skip_empty_topics() {
        let topics = [
            topic(1, "Kinematics", Some("v = u + at")),
            topic(2, "Empty", Some("   ")),
            topic(3, "Missing", None),
            topic(4, "Dynamics", Some("F = ma")),
        ];
        assert_eq!(
            combine_notes(&topics),
            "## Kinematics\nv = u + at\n\n## Dynamics\nF = ma"
        );
    }

    #[test]
    fn combined_notes_empty_when_no_topic_has_notes() {
        assert!(combine_notes(&[topic(1, "A", None)]).is_empty());
        assert!(combine_notes(&[]).is_empty());
    }
}
