// src/generator/parse.rs

use super::GenerationError;
use crate::models::question::GeneratedQuestion;

/// Removes a surrounding markdown code fence (```json ... ``` or ``` ... ```).
/// Text without a fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag that shares the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses model output into questions. The output must be a JSON array.
pub fn parse_questions(raw: &str) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let cleaned = strip_code_fence(raw);
    let questions: Vec<GeneratedQuestion> = serde_json::from_str(cleaned)?;
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"[{"question_text":"2+2?","options":["3","4","5","6"],"correct_index":1,"marks":1}]"#;

    #[test]
    fn plain_array_passes_through() {
        let questions = parse_questions(ITEM).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "2+2?");
        assert_eq!(questions[0].correct_index, 1);
    }

    #[test]
    fn json_fence_is_stripped() {
        let fenced = format!("```json\n{}\n```", ITEM);
        let questions = parse_questions(&fenced).unwrap();
        assert_eq!(questions[0].options, vec!["3", "4", "5", "6"]);
    }

    #[test]
    fn bare_fence_is_stripped() {
        let fenced = format!("  ```\n{}```  ", ITEM);
        assert_eq!(strip_code_fence(&fenced), ITEM);
    }

    #[test]
    fn single_line_fence_is_stripped() {
        let fenced = format!("```json{}```", ITEM);
        assert_eq!(strip_code_fence(&fenced), ITEM);
    }

    #[test]
    fn missing_marks_defaults() {
        let raw = r#"[{"question_text":"q","options":["a","b","c","d"],"correct_index":0}]"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions[0].marks, crate::config::DEFAULT_QUESTION_MARKS);
    }

    #[test]
    fn prose_is_rejected() {
        let err = parse_questions("Sure! Here are your questions.").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidJson(_)));
    }

    #[test]
    fn object_instead_of_array_is_rejected() {
        assert!(parse_questions(r#"{"questions": []}"#).is_err());
    }
}
