// src/models/attempt.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use sqlx::FromRow;

/// Represents the 'exam_attempts' table in the database.
/// An attempt moves from in-progress to completed exactly once.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub id: i64,
    pub user_id: i64,
    pub exam_id: i64,
    pub start_time: DateTime<Utc>,
    /// Exam duration at the moment the attempt started.
    pub duration_minutes: i32,
    pub submit_time: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub total_score: f64,
}

/// History row: an attempt joined with its exam's title.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AttemptSummary {
    pub id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub start_time: DateTime<Utc>,
    pub submit_time: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub total_score: f64,
}

/// A recorded answer with its outcome.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ResponseDetail {
    pub question_id: i64,
    pub selected_option_id: i64,
    pub is_correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptDetail {
    #[serde(flatten)]
    pub attempt: ExamAttempt,
    pub responses: Vec<ResponseDetail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub attempt_id: i64,
    pub start_time: DateTime<Utc>,
    /// Exam duration in minutes.
    pub duration: i32,
}

/// DTO for submitting an attempt.
/// A missing or null `attempt_id` is reported as an invalid attempt by the handler.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub attempt_id: Option<i64>,

    /// Key: question ID. Value: selected option ID.
    #[serde(default)]
    pub answers: HashMap<i64, i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitExamResponse {
    pub score: f64,
    pub total_marks: i32,
    pub status: String,
}
