// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub course_id: i64,
    pub topic_id: Option<i64>,
    pub title: String,

    /// Time allowed for one attempt. Updated by bulk import.
    pub duration_minutes: i32,

    /// Fraction of a question's marks deducted for a wrong answer.
    pub negative_marking_ratio: f64,

    pub total_marks: i32,
}

#[derive(Debug, Deserialize)]
pub struct ExamListParams {
    pub course_id: Option<i64>,
    pub topic_id: Option<i64>,
}

/// DTO for creating an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    pub course_id: i64,
    pub topic_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub negative_marking_ratio: f64,
    #[validate(range(min = 0))]
    pub total_marks: i32,
}
