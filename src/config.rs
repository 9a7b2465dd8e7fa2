// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

/// Character budget for notes in the single-topic prompt.
pub const TEXT_SOURCE_CHAR_LIMIT: usize = 15_000;

/// Character budget for the combined prompt (subject tests, image generation).
pub const COMBINED_SOURCE_CHAR_LIMIT: usize = 25_000;

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const DEFAULT_DIFFICULTY: &str = "Medium";

/// Marks assigned to an imported question when the generator omitted them.
pub const DEFAULT_QUESTION_MARKS: i32 = 2;

pub const OPTIONS_PER_QUESTION: usize = 4;

/// What the question generator returns when the model call or parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Return no questions at all.
    Empty,
    /// Return a single zero-mark error question so clients can still render a list.
    Placeholder,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(FailurePolicy::Empty),
            "placeholder" => Ok(FailurePolicy::Placeholder),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub server_port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub generation_on_failure: FailurePolicy,
    /// Seconds allowed past an exam's duration before submissions are refused.
    /// `None` disables the server-side deadline.
    pub attempt_grace_seconds: Option<i64>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let gemini_api_key = env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let gemini_base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let gemini_timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let generation_on_failure = env::var("GENERATION_ON_FAILURE")
            .map(|v| {
                v.parse::<FailurePolicy>()
                    .expect("GENERATION_ON_FAILURE must be 'empty' or 'placeholder'")
            })
            .unwrap_or(FailurePolicy::Placeholder);

        let attempt_grace_seconds = parse_grace_seconds(env::var("ATTEMPT_GRACE_SECONDS").ok());

        Self {
            database_url,
            jwt_secret,
            rust_log,
            server_port,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            gemini_timeout_secs,
            generation_on_failure,
            attempt_grace_seconds,
        }
    }
}

fn parse_grace_seconds(raw: Option<String>) -> Option<i64> {
    raw.map(|v| {
        v.trim()
            .parse::<i64>()
            .expect("ATTEMPT_GRACE_SECONDS must be an integer number of seconds")
    })
    .filter(|secs| *secs >= 0)
}
