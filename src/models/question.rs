// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::config::{DEFAULT_QUESTION_MARKS, OPTIONS_PER_QUESTION};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub exam_id: i64,
    pub text_content: String,
    pub marks: i32,
}

/// Represents the 'options' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,

    /// Order of the option within its question, starting at 0.
    pub position: i32,
}

/// DTO for sending an option to students (no correctness flag).
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// DTO for sending a question to students.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text_content: String,
    pub marks: i32,
    pub options: Vec<PublicOption>,
}

fn default_marks() -> i32 {
    DEFAULT_QUESTION_MARKS
}

/// A question as produced by the generator and accepted by bulk import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    #[serde(default = "default_marks")]
    pub marks: i32,
}

impl GeneratedQuestion {
    /// Zero-mark stand-in returned when generation fails.
    pub fn placeholder() -> Self {
        Self {
            question_text: "Error generating questions. Please try again.".to_string(),
            options: vec!["Error".to_string(); OPTIONS_PER_QUESTION],
            correct_index: 0,
            marks: 0,
        }
    }

    /// Checks the shape required for import: four options, exactly one of them correct.
    pub fn check(&self) -> Result<(), String> {
        if self.question_text.trim().is_empty() {
            return Err("question_text is empty".to_string());
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "expected {} options, got {}",
                OPTIONS_PER_QUESTION,
                self.options.len()
            ));
        }
        if !(0..OPTIONS_PER_QUESTION as i64).contains(&self.correct_index) {
            return Err(format!(
                "correct_index {} is outside 0..={}",
                self.correct_index,
                OPTIONS_PER_QUESTION - 1
            ));
        }
        if self.marks < 0 {
            return Err(format!("marks {} is negative", self.marks));
        }
        Ok(())
    }

    /// Index of the correct option; only meaningful after `check` passed.
    pub fn correct_position(&self) -> usize {
        self.correct_index as usize
    }
}

/// Validates a whole import batch, naming the first offending item.
pub fn check_batch(questions: &[GeneratedQuestion]) -> Result<(), String> {
    for (idx, question) in questions.iter().enumerate() {
        question
            .check()
            .map_err(|reason| format!("question {}: {}", idx, reason))?;
    }
    Ok(())
}
