// src/handlers/attempt.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    config::Config,
    error::AppError,
    handlers::catalog::fetch_exam,
    models::attempt::{
        AttemptDetail, AttemptSummary, ExamAttempt, ResponseDetail, StartAttemptResponse,
        SubmitExamRequest, SubmitExamResponse,
    },
    utils::{extract::AppJson, jwt::Claims},
};

/// Marks of a question belonging to the exam being submitted.
#[derive(sqlx::FromRow)]
struct QuestionMarks {
    id: i64,
    marks: i32,
}

/// Answer key row for a selected option.
#[derive(sqlx::FromRow)]
struct OptionKey {
    id: i64,
    question_id: i64,
    is_correct: bool,
}

/// An answer that refers to a real question of the exam and one of its options.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedAnswer {
    question_id: i64,
    option_id: i64,
    marks: i32,
    is_correct: bool,
}

/// Keeps only answers whose question belongs to the exam and whose option belongs to
/// that question. Everything else is skipped without error.
fn resolve_answers(
    answers: &HashMap<i64, i64>,
    question_marks: &HashMap<i64, i32>,
    option_keys: &HashMap<i64, (i64, bool)>,
) -> Vec<ResolvedAnswer> {
    let mut resolved: Vec<ResolvedAnswer> = answers
        .iter()
        .filter_map(|(&question_id, &option_id)| {
            let marks = *question_marks.get(&question_id)?;
            let &(owner, is_correct) = option_keys.get(&option_id)?;
            (owner == question_id).then_some(ResolvedAnswer {
                question_id,
                option_id,
                marks,
                is_correct,
            })
        })
        .collect();

    resolved.sort_by_key(|a| a.question_id);
    resolved
}

/// Score change for one answer: full marks if correct, minus `marks * ratio` otherwise.
fn answer_delta(marks: i32, is_correct: bool, negative_marking_ratio: f64) -> f64 {
    if is_correct {
        f64::from(marks)
    } else {
        -f64::from(marks) * negative_marking_ratio
    }
}

/// Total score with negative marking, floored at zero.
fn calculate_score(answers: &[ResolvedAnswer], negative_marking_ratio: f64) -> f64 {
    let raw: f64 = answers
        .iter()
        .map(|a| answer_delta(a.marks, a.is_correct, negative_marking_ratio))
        .sum();
    raw.max(0.0)
}

/// Whether `submitted_at` falls after the attempt window plus grace.
/// The window is the duration recorded when the attempt started.
/// Without a grace setting there is no deadline.
fn is_past_deadline(
    start_time: DateTime<Utc>,
    duration_minutes: i32,
    grace_seconds: Option<i64>,
    submitted_at: DateTime<Utc>,
) -> bool {
    match grace_seconds {
        Some(grace) => {
            let deadline = start_time
                + Duration::minutes(i64::from(duration_minutes))
                + Duration::seconds(grace);
            submitted_at > deadline
        }
        None => false,
    }
}

/// Starts a new attempt of an exam for the current user.
pub async fn start_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    let user_id = claims.user_id()?;

    let attempt = sqlx::query_as::<_, ExamAttempt>(
        r#"
        INSERT INTO exam_attempts (user_id, exam_id, duration_minutes)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, exam_id, start_time, duration_minutes, submit_time, is_completed, total_score
        "#,
    )
    .bind(user_id)
    .bind(exam.id)
    .bind(exam.duration_minutes)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(attempt_id = attempt.id, exam_id = exam.id, user_id, "Attempt started");

    Ok(Json(StartAttemptResponse {
        attempt_id: attempt.id,
        start_time: attempt.start_time,
        duration: attempt.duration_minutes,
    }))
}

/// Submits answers for an attempt and scores them.
///
/// * The attempt is claimed with a conditional update, so only one submission succeeds.
/// * Unknown questions and options that do not belong to their question are skipped.
/// * Wrong answers cost `marks * negative_marking_ratio`; the total never drops below zero.
pub async fn submit_exam(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
    AppJson(req): AppJson<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    let user_id = claims.user_id()?;
    let attempt_id = req
        .attempt_id
        .ok_or(AppError::BadRequest("Invalid attempt".to_string()))?;

    let mut tx = pool.begin().await?;

    let claimed = sqlx::query_as::<_, ExamAttempt>(
        r#"
        UPDATE exam_attempts
        SET is_completed = TRUE, submit_time = NOW()
        WHERE id = $1 AND user_id = $2 AND exam_id = $3 AND is_completed = FALSE
        RETURNING id, user_id, exam_id, start_time, duration_minutes, submit_time, is_completed, total_score
        "#,
    )
    .bind(attempt_id)
    .bind(user_id)
    .bind(exam.id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(attempt) = claimed else {
        let existing: Option<bool> = sqlx::query_scalar(
            "SELECT is_completed FROM exam_attempts WHERE id = $1 AND user_id = $2 AND exam_id = $3",
        )
        .bind(attempt_id)
        .bind(user_id)
        .bind(exam.id)
        .fetch_optional(&mut *tx)
        .await?;

        return Err(match existing {
            Some(true) => AppError::BadRequest("Exam already submitted".to_string()),
            _ => AppError::BadRequest("Invalid attempt".to_string()),
        });
    };

    let submitted_at = attempt.submit_time.unwrap_or_else(Utc::now);
    if is_past_deadline(
        attempt.start_time,
        attempt.duration_minutes,
        config.attempt_grace_seconds,
        submitted_at,
    ) {
        // Dropping the transaction rolls the claim back.
        tracing::warn!(attempt_id = attempt.id, "Late submission rejected");
        return Err(AppError::BadRequest("Attempt time has expired".to_string()));
    }

    let question_marks: HashMap<i64, i32> = sqlx::query_as::<_, QuestionMarks>(
        "SELECT id, marks FROM questions WHERE exam_id = $1",
    )
    .bind(exam.id)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|q| (q.id, q.marks))
    .collect();

    let option_ids: Vec<i64> = req.answers.values().copied().collect();
    let option_keys: HashMap<i64, (i64, bool)> = sqlx::query_as::<_, OptionKey>(
        "SELECT id, question_id, is_correct FROM options WHERE id = ANY($1)",
    )
    .bind(&option_ids)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|k| (k.id, (k.question_id, k.is_correct)))
    .collect();

    let resolved = resolve_answers(&req.answers, &question_marks, &option_keys);

    if !resolved.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO student_responses (attempt_id, question_id, selected_option_id) ",
        );
        builder.push_values(&resolved, |mut row, answer| {
            row.push_bind(attempt.id)
                .push_bind(answer.question_id)
                .push_bind(answer.option_id);
        });
        builder.build().execute(&mut *tx).await.map_err(|e| {
            tracing::error!("Failed to record responses: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    }

    let score = calculate_score(&resolved, exam.negative_marking_ratio);

    sqlx::query("UPDATE exam_attempts SET total_score = $1 WHERE id = $2")
        .bind(score)
        .bind(attempt.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        attempt_id = attempt.id,
        answered = req.answers.len(),
        recorded = resolved.len(),
        score,
        "Attempt submitted"
    );

    Ok(Json(SubmitExamResponse {
        score,
        total_marks: exam.total_marks,
        status: "Completed".to_string(),
    }))
}

/// Lists the current user's attempts, newest first.
pub async fn list_history(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let history = sqlx::query_as::<_, AttemptSummary>(
        r#"
        SELECT
            a.id,
            a.exam_id,
            e.title AS exam_title,
            a.start_time,
            a.submit_time,
            a.is_completed,
            a.total_score
        FROM exam_attempts a
        JOIN exams e ON e.id = a.exam_id
        WHERE a.user_id = $1
        ORDER BY a.start_time DESC, a.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch attempt history: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(history))
}

/// Returns one of the current user's attempts with its recorded responses.
pub async fn get_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let attempt = sqlx::query_as::<_, ExamAttempt>(
        r#"
        SELECT id, user_id, exam_id, start_time, duration_minutes, submit_time, is_completed, total_score
        FROM exam_attempts
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    let responses = sqlx::query_as::<_, ResponseDetail>(
        r#"
        SELECT r.question_id, r.selected_option_id, o.is_correct
        FROM student_responses r
        JOIN options o ON o.id = r.selected_option_id
        WHERE r.attempt_id = $1
        ORDER BY r.question_id
        "#,
    )
    .bind(attempt.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(AttemptDetail {
        attempt,
        responses,
    }))
}
