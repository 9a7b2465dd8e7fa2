// src/generator/prompt.rs

use crate::config::{COMBINED_SOURCE_CHAR_LIMIT, TEXT_SOURCE_CHAR_LIMIT};

/// Which prompt layout to use. The combined layout is used when notes from several
/// topics (or an image) are sent together, and gets a larger character budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    TextOnly,
    Combined,
}

impl PromptMode {
    pub fn char_limit(self) -> usize {
        match self {
            PromptMode::TextOnly => TEXT_SOURCE_CHAR_LIMIT,
            PromptMode::Combined => COMBINED_SOURCE_CHAR_LIMIT,
        }
    }

    pub fn default_style(self) -> &'static str {
        match self {
            PromptMode::TextOnly => "General Competitive Exam standards",
            PromptMode::Combined => "standard exam pattern",
        }
    }
}

/// Cuts `text` to at most `limit` characters. May split mid-sentence.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub struct PromptInput<'a> {
    pub mode: PromptMode,
    pub source_text: &'a str,
    pub num_questions: u32,
    pub difficulty: &'a str,
    pub custom_instructions: &'a str,
    pub with_image: bool,
}

pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let style_guide = if input.custom_instructions.trim().is_empty() {
        input.mode.default_style()
    } else {
        input.custom_instructions.trim()
    };

    let source = truncate_chars(input.source_text, input.mode.char_limit());

    let mut prompt = format!(
        r#"Act as an expert exam setter.

CONTEXT / EXAM STYLE:
{style_guide}

TASK:
Generate {count} Multiple Choice Questions (MCQ) based strictly on the source material provided below.
DIFFICULTY LEVEL: {difficulty}

STRICT JSON OUTPUT FORMAT:
The output MUST be a valid JSON array. Do not include markdown formatting like ```json ... ```.
Every question has exactly 4 options and "correct_index" is an integer from 0 to 3.
[
    {{
        "question_text": "Question here...",
        "options": ["Option A", "Option B", "Option C", "Option D"],
        "correct_index": 0,
        "marks": 1
    }}
]
"#,
        count = input.num_questions,
        difficulty = input.difficulty,
    );

    if input.with_image {
        prompt.push_str("\nThe attached image is part of the source material.\n");
    }

    if !source.trim().is_empty() {
        prompt.push_str("\nSOURCE MATERIAL (NOTES):\n");
        prompt.push_str(source);
        prompt.push('\n');
    }

    prompt
}
