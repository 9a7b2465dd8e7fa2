// src/models/topic.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'topics' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub course_id: i64,
    pub name: String,

    /// Source material for question generation.
    pub study_notes: Option<String>,
}

impl Topic {
    /// Notes that can be sent to the generator, if any.
    pub fn usable_notes(&self) -> Option<&str> {
        self.study_notes
            .as_deref()
            .filter(|notes| !notes.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct TopicListParams {
    pub course_id: Option<i64>,
}

/// DTO for creating a topic.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    pub course_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub study_notes: Option<String>,
}

/// DTO for replacing a topic's study notes.
#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub study_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(notes: Option<&str>) -> Topic {
        Topic {
            id: 1,
            course_id: 1,
            name: "Optics".to_string(),
            study_notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn blank_notes_are_not_usable() {
        assert_eq!(topic(None).usable_notes(), None);
        assert_eq!(topic(Some("  \n")).usable_notes(), None);
        assert_eq!(topic(Some("Snell's law")).usable_notes(), Some("Snell's law"));
    }
}
