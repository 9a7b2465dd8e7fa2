// src/generator/mod.rs

//! MCQ generation through an external generative model.
//!
//! [`QuestionGenerator`] never fails: any model, decoding or parsing error is logged and
//! turned into the configured [`FailurePolicy`] result.

pub mod gemini;
pub mod image;
pub mod parse;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{config::FailurePolicy, models::question::GeneratedQuestion};

pub use gemini::GeminiClient;
pub use image::ImageInput;
pub use prompt::PromptMode;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model response contained no text")]
    EmptyResponse,

    #[error("model output is not a valid question array: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("{0}")]
    Model(String),
}

/// What is sent to the model: the full prompt and an optional image.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub image: Option<ImageInput>,
}

/// External text generation backend.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<String, GenerationError>;
}

/// One generation call as issued by a handler.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub mode: PromptMode,
    pub source_text: String,
    pub num_questions: u32,
    pub difficulty: String,
    pub custom_instructions: String,
    /// Base64 image (or `data:` URL), decoded before the model is called.
    pub image_base64: Option<String>,
    /// Overrides the generator's default policy for this call.
    pub on_failure: Option<FailurePolicy>,
}

pub struct QuestionGenerator {
    model: Arc<dyn GenerativeModel>,
    default_policy: FailurePolicy,
}

impl QuestionGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>, default_policy: FailurePolicy) -> Self {
        Self {
            model,
            default_policy,
        }
    }

    /// Generates up to `num_questions` questions, or the fallback for the effective policy.
    pub async fn generate(&self, request: GenerationRequest) -> Vec<GeneratedQuestion> {
        let policy = request.on_failure.unwrap_or(self.default_policy);

        match self.try_generate(&request).await {
            Ok(questions) => {
                tracing::info!(
                    requested = request.num_questions,
                    received = questions.len(),
                    "Generated questions"
                );
                questions
            }
            Err(e) => {
                tracing::error!("AI generation failed, applying {:?} fallback: {}", policy, e);
                fallback_questions(policy)
            }
        }
    }

    async fn try_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let image = request
            .image_base64
            .as_deref()
            .map(image::decode_image)
            .transpose()?;

        let prompt = prompt::build_prompt(&prompt::PromptInput {
            mode: request.mode,
            source_text: &request.source_text,
            num_questions: request.num_questions,
            difficulty: &request.difficulty,
            custom_instructions: &request.custom_instructions,
            with_image: image.is_some(),
        });

        let raw = self.model.generate(&ModelRequest { prompt, image }).await?;

        let mut questions = parse::parse_questions(&raw)?;
        questions.truncate(request.num_questions as usize);
        Ok(questions)
    }
}

pub fn fallback_questions(policy: FailurePolicy) -> Vec<GeneratedQuestion> {
    match policy {
        FailurePolicy::Empty => Vec::new(),
        FailurePolicy::Placeholder => vec![GeneratedQuestion::placeholder()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubModel {
        reply: Result<String, String>,
        seen: Mutex<Vec<ModelRequest>>,
    }

    impl StubModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(msg: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(msg.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerativeModel for StubModel {
        async fn generate(&self, request: &ModelRequest) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(GenerationError::Model)
        }
    }

    fn request(num_questions: u32) -> GenerationRequest {
        GenerationRequest {
            mode: PromptMode::TextOnly,
            source_text: "Photosynthesis converts light into chemical energy.".to_string(),
            num_questions,
            difficulty: "Easy".to_string(),
            custom_instructions: String::new(),
            image_base64: None,
            on_failure: None,
        }
    }

    fn items(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"question_text":"Q{i}","options":["a","b","c","d"],"correct_index":{},"marks":1}}"#,
                    i % 4
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn fenced_reply_is_parsed() {
        let model = StubModel::replying(&format!("```json\n{}\n```", items(2)));
        let generator = QuestionGenerator::new(model.clone(), FailurePolicy::Placeholder);

        let questions = generator.generate(request(2)).await;

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question_text, "Q1");
        assert_eq!(questions[1].correct_index, 1);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn extra_questions_are_dropped() {
        let model = StubModel::replying(&items(6));
        let generator = QuestionGenerator::new(model, FailurePolicy::Empty);

        let questions = generator.generate(request(3)).await;
        assert_eq!(questions.len(), 3);
    }

    #[tokio::test]
    async fn model_error_yields_placeholder_by_default() {
        let generator =
            QuestionGenerator::new(StubModel::failing("quota exceeded"), FailurePolicy::Placeholder);

        let questions = generator.generate(request(5)).await;

        assert_eq!(questions, vec![GeneratedQuestion::placeholder()]);
        assert_eq!(questions[0].marks, 0);
    }

    #[tokio::test]
    async fn request_policy_overrides_default() {
        let generator =
            QuestionGenerator::new(StubModel::failing("boom"), FailurePolicy::Placeholder);

        let mut req = request(5);
        req.on_failure = Some(FailurePolicy::Empty);

        assert!(generator.generate(req).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_applies_fallback() {
        let generator = QuestionGenerator::new(
            StubModel::replying("I cannot help with that."),
            FailurePolicy::Empty,
        );
        assert!(generator.generate(request(5)).await.is_empty());
    }

    #[tokio::test]
    async fn undecodable_image_never_reaches_model() {
        let model = StubModel::replying(&items(1));
        let generator = QuestionGenerator::new(model.clone(), FailurePolicy::Empty);

        let mut req = request(1);
        req.mode = PromptMode::Combined;
        req.image_base64 = Some("%%%".to_string());

        assert!(generator.generate(req).await.is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn image_is_forwarded_with_prompt() {
        use base64::Engine;

        let model = StubModel::replying(&items(1));
        let generator = QuestionGenerator::new(model.clone(), FailurePolicy::Empty);

        let mut req = request(1);
        req.mode = PromptMode::Combined;
        req.image_base64 = Some(
            base64::engine::general_purpose::STANDARD.encode(b"GIF89a\x01\x00\x01\x00"),
        );

        assert_eq!(generator.generate(req).await.len(), 1);
        let seen = model.seen.lock().unwrap();
        let image = seen[0].image.as_ref().unwrap();
        assert_eq!(image.mime_type, "image/gif");
        assert!(seen[0].prompt.contains("attached image"));
    }
}
