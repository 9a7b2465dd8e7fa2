// src/handlers/banner.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::banner::{Banner, CreateBannerRequest},
    utils::extract::AppJson,
};

/// Lists banners, newest first. Public.
pub async fn list_banners(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let banners = sqlx::query_as::<_, Banner>(
        r#"
        SELECT id, title, description, button_text, link, bg_gradient_from, bg_gradient_to, created_at
        FROM banners
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch banners: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(banners))
}

/// Creates a banner.
/// Admin only.
pub async fn create_banner(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<CreateBannerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let banner = sqlx::query_as::<_, Banner>(
        r#"
        INSERT INTO banners (title, description, button_text, link, bg_gradient_from, bg_gradient_to)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, description, button_text, link, bg_gradient_from, bg_gradient_to, created_at
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.button_text)
    .bind(&payload.link)
    .bind(&payload.bg_gradient_from)
    .bind(&payload.bg_gradient_to)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create banner: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(banner_id = banner.id, "Banner created");

    Ok((StatusCode::CREATED, Json(banner)))
}

/// Deletes a banner.
/// Admin only.
pub async fn delete_banner(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM banners WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete banner: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Banner not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
