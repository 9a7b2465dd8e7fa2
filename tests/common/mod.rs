// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use exam_backend::{
    config::{Config, FailurePolicy},
    generator::{GenerationError, GenerativeModel, ModelRequest, QuestionGenerator},
    routes,
    state::AppState,
    utils::jwt::sign_jwt,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

/// Model double: replies with a fixed text, or fails when `reply` is `None`.
pub struct StubModel {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate(&self, _request: &ModelRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| GenerationError::Model("stub model unavailable".to_string()))
    }
}

pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port against the Postgres in `DATABASE_URL`.
pub async fn spawn_app(model: Arc<StubModel>, grace_seconds: Option<i64>) -> TestApp {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url,
        jwt_secret: TEST_SECRET.to_string(),
        rust_log: "error".to_string(),
        server_port: 0,
        gemini_api_key: "unused".to_string(),
        gemini_model: "stub".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        gemini_timeout_secs: 1,
        generation_on_failure: FailurePolicy::Placeholder,
        attempt_grace_seconds: grace_seconds,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
        generator: Arc::new(QuestionGenerator::new(model, FailurePolicy::Placeholder)),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Signs a token for a fresh identity and returns `(id, bearer token)`.
    /// Users live in the identity service, so nothing is inserted.
    pub fn create_user(&self, role: &str) -> (i64, String) {
        let id = (uuid::Uuid::new_v4().as_u64_pair().0 >> 1) as i64;
        let token = sign_jwt(id, role, TEST_SECRET, 600).unwrap();
        (id, token)
    }

    pub async fn create_course(&self) -> i64 {
        sqlx::query_scalar("INSERT INTO courses (name) VALUES ($1) RETURNING id")
            .bind(format!("Course {}", uuid::Uuid::new_v4()))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn create_topic(&self, course_id: i64, notes: Option<&str>) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO topics (course_id, name, study_notes) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(course_id)
        .bind("Topic")
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn create_exam(&self, course_id: i64, duration: i32, ratio: f64) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO exams (course_id, title, duration_minutes, negative_marking_ratio, total_marks)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind("Mock Test")
        .bind(duration)
        .bind(ratio)
        .bind(100)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    /// Inserts a question with four options; returns `(question_id, option_ids)`.
    pub async fn create_question(
        &self,
        exam_id: i64,
        marks: i32,
        correct_index: usize,
    ) -> (i64, Vec<i64>) {
        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (exam_id, text_content, marks) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(exam_id)
        .bind("What is the answer?")
        .bind(marks)
        .fetch_one(&self.pool)
        .await
        .unwrap();

        let mut option_ids = Vec::new();
        for idx in 0..4 {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO options (question_id, text, is_correct, position)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(question_id)
            .bind(format!("Option {}", idx))
            .bind(idx == correct_index)
            .bind(idx as i32)
            .fetch_one(&self.pool)
            .await
            .unwrap();
            option_ids.push(id);
        }

        (question_id, option_ids)
    }
}
