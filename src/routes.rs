// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, ai_generator, attempt, banner, catalog},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Courses and banners are public; everything else needs a bearer token.
/// * Generation, bulk import and content management additionally need the admin role.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let course_routes = Router::new()
        .route("/", get(catalog::list_courses))
        .route("/{id}", get(catalog::get_course));

    let banner_routes = Router::new().route("/", get(banner::list_banners));

    let topic_routes = Router::new()
        .route("/", get(catalog::list_topics))
        .route("/{id}", get(catalog::get_topic))
        .layer(auth.clone());

    let exam_routes = Router::new()
        .route("/", get(catalog::list_exams))
        .route("/{id}", get(catalog::get_exam))
        .route("/{id}/questions", get(catalog::get_exam_questions))
        .route("/{id}/start_attempt", post(attempt::start_attempt))
        .route("/{id}/submit_exam", post(attempt::submit_exam))
        .layer(auth.clone());

    let attempt_routes = Router::new()
        .route("/", get(attempt::list_history))
        .route("/{id}", get(attempt::get_attempt))
        .layer(auth.clone());

    // Auth runs first (outermost), then the admin check.
    let generator_routes = Router::new()
        .route("/generate", post(ai_generator::generate))
        .route(
            "/generate_subject_test",
            post(ai_generator::generate_subject_test),
        )
        .route("/generate_from_image", post(ai_generator::generate_from_image))
        .route("/save_bulk", post(ai_generator::save_bulk))
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth.clone());

    let admin_routes = Router::new()
        .route("/courses", post(admin::create_course))
        .route("/topics", post(admin::create_topic))
        .route("/topics/{id}/notes", put(admin::update_topic_notes))
        .route("/exams", post(admin::create_exam))
        .route("/banners", post(banner::create_banner))
        .route("/banners/{id}", delete(banner::delete_banner))
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth);

    Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/banners", banner_routes)
        .nest("/api/topics", topic_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/attempts", attempt_routes)
        .nest("/api/ai-generator", generator_routes)
        .nest("/api/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
