use super::models::{AddCompetitorRequest, RecordAdActivityRequest};
use crate::common::{normalize_username, ValidationResult, Validator};

impl Validator<AddCompetitorRequest> for AddCompetitorRequest {
    fn validate(&self, data: &AddCompetitorRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.channel_id.trim().is_empty() {
            result.add_error("channel_id", "Channel id is required");
        }

        result.check_text(
            "telegram_username",
            &normalize_username(&data.telegram_username),
            255,
        );

        if let Some(title) = &data.title {
            if title.chars().count() > 512 {
                result.add_error("title", "Title must not exceed 512 characters");
            }
        }

        result
    }
}

impl Validator<RecordAdActivityRequest> for RecordAdActivityRequest {
    fn validate(&self, data: &RecordAdActivityRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(description) = &data.description {
            if description.chars().count() > 2000 {
                result.add_error("description", "Description must not exceed 2000 characters");
            }
        }

        if let Some(url) = &data.post_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                result.add_error("post_url", "Post URL must be an http(s) link");
            } else if url.len() > 2048 {
                result.add_error("post_url", "Post URL must not exceed 2048 characters");
            }
        }

        result
    }
}
