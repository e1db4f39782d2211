use super::models::{
    GeneratePostRequest, MassReplyRequest, ReputationTemplatesRequest, SmartSandwichRequest,
    MAX_REPLY_COUNT,
};
use crate::common::{ValidationResult, Validator};

impl Validator<GeneratePostRequest> for GeneratePostRequest {
    fn validate(&self, data: &GeneratePostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_text("topic", &data.topic, 500);

        if let Some(style) = &data.style_hint {
            if style.chars().count() > 200 {
                result.add_error("style_hint", "Style hint must not exceed 200 characters");
            }
        }

        result
    }
}

impl Validator<SmartSandwichRequest> for SmartSandwichRequest {
    fn validate(&self, data: &SmartSandwichRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_text("post_context", &data.post_context, 4000);
        result
    }
}

impl Validator<ReputationTemplatesRequest> for ReputationTemplatesRequest {
    fn validate(&self, data: &ReputationTemplatesRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_text("negative_comment", &data.negative_comment, 2000);
        result
    }
}

impl Validator<MassReplyRequest> for MassReplyRequest {
    fn validate(&self, data: &MassReplyRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_text("base_comment", &data.base_comment, 2000);

        if !(1..=MAX_REPLY_COUNT).contains(&data.count) {
            result.add_error("count", "Count must be between 1 and 20");
        }

        result
    }
}
