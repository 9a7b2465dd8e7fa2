// src/models/banner.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'banners' table in the database.
/// Promotional cards shown on the landing page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Banner {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub link: String,
    pub bg_gradient_from: String,
    pub bg_gradient_to: String,
    pub created_at: DateTime<Utc>,
}

fn default_button_text() -> String {
    "Explore".to_string()
}

fn default_link() -> String {
    "/register".to_string()
}

fn default_gradient_from() -> String {
    "blue-600".to_string()
}

fn default_gradient_to() -> String {
    "purple-600".to_string()
}

/// Gradient stops are colour tokens such as `emerald-600`, spliced into CSS class names.
fn validate_color_token(token: &str) -> Result<(), ValidationError> {
    let well_formed = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !well_formed {
        return Err(ValidationError::new("invalid_color_token"));
    }
    Ok(())
}

/// DTO for creating a banner. Everything except the title has a default.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBannerRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
    #[serde(default = "default_button_text")]
    #[validate(length(min = 1, max = 50))]
    pub button_text: String,
    #[serde(default = "default_link")]
    #[validate(length(min = 1, max = 500))]
    pub link: String,
    #[serde(default = "default_gradient_from")]
    #[validate(length(max = 32), custom(function = "validate_color_token"))]
    pub bg_gradient_from: String,
    #[serde(default = "default_gradient_to")]
    #[validate(length(max = 32), custom(function = "validate_color_token"))]
    pub bg_gradient_to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_only_request_gets_defaults() {
        let req: CreateBannerRequest =
            serde_json::from_str(r#"{"title": "New Batch Starting!"}"#).unwrap();
        assert_eq!(req.button_text, "Explore");
        assert_eq!(req.link, "/register");
        assert_eq!(req.bg_gradient_from, "blue-600");
        assert_eq!(req.bg_gradient_to, "purple-600");
        assert!(req.description.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let req: CreateBannerRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn gradient_must_be_a_colour_token() {
        assert!(validate_color_token("orange-500").is_ok());
        assert!(validate_color_token("slate-800").is_ok());
        assert!(validate_color_token("red\" onclick=\"x").is_err());
        assert!(validate_color_token("").is_err());
    }
}
