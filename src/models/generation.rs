// src/models/generation.rs

use serde::Deserialize;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use validator::Validate;

use crate::config::{DEFAULT_DIFFICULTY, DEFAULT_QUESTION_COUNT, FailurePolicy};
use crate::models::question::GeneratedQuestion;

fn default_num_questions() -> u32 {
    DEFAULT_QUESTION_COUNT
}

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

/// DTO for generating questions from one topic's notes.
/// Ids and counts may arrive as numeric strings from form inputs.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub topic_id: i64,
    #[serde(default = "default_num_questions")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: u32,
    #[serde(default = "default_difficulty")]
    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,
    #[validate(length(max = 2000))]
    pub custom_instructions: Option<String>,
    pub on_failure: Option<FailurePolicy>,
}

/// DTO for generating a test covering every topic of a course.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct SubjectTestRequest {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub course_id: i64,
    #[serde(default = "default_num_questions")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: u32,
    #[serde(default = "default_difficulty")]
    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,
    #[validate(length(max = 2000))]
    pub custom_instructions: Option<String>,
    pub on_failure: Option<FailurePolicy>,
}

/// DTO for generating questions from an uploaded image.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct ImageGenerateRequest {
    /// Base64 image data, optionally as a `data:` URL.
    #[validate(length(min = 1))]
    pub image: String,
    /// Topic whose notes are sent alongside the image.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub topic_id: Option<i64>,
    #[serde(default = "default_num_questions")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: u32,
    #[serde(default = "default_difficulty")]
    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,
    #[validate(length(max = 2000))]
    pub custom_instructions: Option<String>,
    pub on_failure: Option<FailurePolicy>,
}

/// DTO for persisting generated questions into an exam.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct BulkSaveRequest {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub exam_id: i64,
    /// New exam duration in minutes. Zero or absent leaves the duration unchanged.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[validate(range(min = 0, max = 1440))]
    pub duration: Option<i32>,
    #[serde(default)]
    pub questions: Vec<GeneratedQuestion>,
}

impl BulkSaveRequest {
    pub fn new_duration(&self) -> Option<i32> {
        self.duration.filter(|minutes| *minutes != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str(r#"{"topic_id": 3}"#).unwrap();
        assert_eq!(req.num_questions, 5);
        assert_eq!(req.difficulty, "Medium");
        assert!(req.on_failure.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn zero_questions_fail_validation() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"topic_id": 3, "num_questions": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_duration_is_not_an_update() {
        let req: BulkSaveRequest =
            serde_json::from_str(r#"{"exam_id": 1, "duration": 0}"#).unwrap();
        assert_eq!(req.new_duration(), None);
        assert!(req.questions.is_empty());

        let req: BulkSaveRequest =
            serde_json::from_str(r#"{"exam_id": 1, "duration": 45}"#).unwrap();
        assert_eq!(req.new_duration(), Some(45));
    }

    #[test]
    fn form_strings_are_accepted_as_numbers() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"topic_id": "12", "num_questions": "5"}"#).unwrap();
        assert_eq!(req.topic_id, 12);
        assert_eq!(req.num_questions, 5);

        let req: BulkSaveRequest =
            serde_json::from_str(r#"{"exam_id": "4", "duration": "90", "questions": []}"#)
                .unwrap();
        assert_eq!(req.exam_id, 4);
        assert_eq!(req.new_duration(), Some(90));

        let req: ImageGenerateRequest =
            serde_json::from_str(r#"{"image": "aGk=", "topic_id": "3"}"#).unwrap();
        assert_eq!(req.topic_id, Some(3));

        let req: ImageGenerateRequest = serde_json::from_str(r#"{"image": "aGk="}"#).unwrap();
        assert_eq!(req.topic_id, None);
    }

    #[test]
    fn non_numeric_strings_are_rejected() {
        assert!(serde_json::from_str::<SubjectTestRequest>(r#"{"course_id": "abc"}"#).is_err());
    }
}
