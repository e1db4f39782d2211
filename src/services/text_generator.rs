// src/services/text_generator.rs
//! Text generation capability used by the content endpoints
//!
//! `RemoteGenerator` talks to an OpenAI-compatible chat completions endpoint.
//! `StaticFallbackGenerator` produces placeholder text and is used when no API
//! key is configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::common::config::{AppConfig, OpenAISettings};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// What to generate. Multi-part results come back one item per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Post {
        topic: String,
        style_hint: Option<String>,
    },
    CommentSandwich {
        post_context: String,
    },
    ReputationReplies {
        negative_comment: String,
    },
    PersonalReplies {
        base_comment: String,
        count: usize,
    },
}

impl GenerationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::Post { .. } => "post",
            GenerationRequest::CommentSandwich { .. } => "smart_sandwich",
            GenerationRequest::ReputationReplies { .. } => "reputation_templates",
            GenerationRequest::PersonalReplies { .. } => "mass_personal_reply",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            GenerationRequest::Post { .. } => {
                "You write concise, engaging posts for Telegram channels."
            }
            GenerationRequest::CommentSandwich { .. } => {
                "You help channel admins seed lively comment threads. Reply with exactly three lines and no numbering."
            }
            GenerationRequest::ReputationReplies { .. } => {
                "You write calm, constructive public replies to negative comments. Reply with exactly three variants, one per line, no numbering."
            }
            GenerationRequest::PersonalReplies { .. } => {
                "You rephrase a reply so each reader gets a personal-sounding variant. One variant per line, no numbering."
            }
        }
    }

    /// User prompt sent to the remote model
    pub fn prompt(&self) -> String {
        match self {
            GenerationRequest::Post { topic, style_hint } => {
                let mut prompt = format!(
                    "Write a short Telegram channel post (2-4 sentences) on topic: {}.",
                    topic
                );
                if let Some(style) = style_hint {
                    prompt.push_str(&format!(" Style: {}.", style));
                }
                prompt
            }
            GenerationRequest::CommentSandwich { post_context } => format!(
                "Post: {}\n\nWrite three comments for this post: 1) an engaging question, 2) a comment developing the topic, 3) a short summary.",
                post_context
            ),
            GenerationRequest::ReputationReplies { negative_comment } => format!(
                "Negative comment: {}\n\nWrite three polite reply variants that acknowledge the problem and offer a next step.",
                negative_comment
            ),
            GenerationRequest::PersonalReplies {
                base_comment,
                count,
            } => format!(
                "Base reply: {}\n\nWrite {} distinct variants of this reply.",
                base_comment, count
            ),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Picks the remote generator when an API key is configured
pub fn build_text_generator(config: &AppConfig) -> Arc<dyn TextGenerator> {
    match &config.openai {
        Some(settings) => {
            info!(model = %settings.model, "Remote text generation enabled");
            Arc::new(RemoteGenerator::new(settings.clone()))
        }
        None => {
            warn!("OPENAI_API_KEY not set, content endpoints return placeholder text");
            Arc::new(StaticFallbackGenerator)
        }
    }
}

// ============================================================================
// Remote generator
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

const MAX_RETRIES: u32 = 3;

#[derive(Debug)]
pub struct RemoteGenerator {
    settings: OpenAISettings,
    client: Client,
}

impl RemoteGenerator {
    pub fn new(settings: OpenAISettings) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { settings, client }
    }

    async fn make_request_with_retry(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenerationError> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.make_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_retries = MAX_RETRIES,
                        error = %e,
                        "Text generation request failed, retrying..."
                    );
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = std::time::Duration::from_millis(500 * 2_u64.pow(attempt - 1));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GenerationError::RequestFailed("Unknown error".to_string())))
    }

    async fn make_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenerationError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Text generation request failed");
            return Err(GenerationError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for RemoteGenerator {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let chat = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt(),
                },
            ],
            temperature: 0.7,
            max_tokens: 600,
        };

        debug!(kind = request.kind(), model = %self.settings.model, "Sending text generation request");

        let response = self.make_request_with_retry(&chat).await?;

        let text = response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("No choices in response".to_string()))?;

        if let Some(usage) = response.usage {
            info!(
                kind = request.kind(),
                model = %self.settings.model,
                tokens_used = usage.total_tokens,
                "Text generation completed"
            );
        }

        Ok(text)
    }
}

// ============================================================================
// Static fallback
// ============================================================================

const REPLY_OPENERS: &[&str] = &[
    "Thanks for the comment",
    "Great question",
    "Appreciate you sharing this",
    "Good point",
    "Glad you noticed",
];

/// Shortens free text for embedding into template sentences
fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Deterministic placeholder output, one item per line for multi-part requests
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFallbackGenerator;

impl StaticFallbackGenerator {
    pub fn render(request: &GenerationRequest) -> String {
        match request {
            GenerationRequest::Post { topic, style_hint } => format!(
                "[AI placeholder] Post about: {}. Style: {}. Set OPENAI_API_KEY to enable real generation.",
                topic,
                style_hint.as_deref().unwrap_or("default")
            ),
            GenerationRequest::CommentSandwich { post_context } => {
                let topic = excerpt(post_context, 60);
                [
                    format!("What do you think about \"{}\"? Has anyone tried this in practice?", topic),
                    "I'd add that it works best when you share concrete numbers and real examples.".to_string(),
                    format!("To sum up: \"{}\" is worth saving and coming back to.", topic),
                ]
                .join("\n")
            }
            GenerationRequest::ReputationReplies { negative_comment } => {
                let quote = excerpt(negative_comment, 60);
                [
                    "Thank you for the honest feedback. We're sorry it fell short, please message us the details so we can fix it.".to_string(),
                    format!("We hear you: \"{}\" is something we take seriously and are already looking into.", quote),
                    "Thanks for raising this publicly. We'll share what we change, and we'd love to hear if it helps.".to_string(),
                ]
                .join("\n")
            }
            GenerationRequest::PersonalReplies {
                base_comment,
                count,
            } => {
                let base = base_comment.trim();
                (0..*count)
                    .map(|i| {
                        let opener = REPLY_OPENERS[i % REPLY_OPENERS.len()];
                        if i < REPLY_OPENERS.len() {
                            format!("{}! {}", opener, base)
                        } else {
                            format!("{} ({})! {}", opener, i + 1, base)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }
}

#[async_trait]
impl TextGenerator for StaticFallbackGenerator {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        Ok(Self::render(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_prompt_includes_style_only_when_given() {
        let plain = GenerationRequest::Post {
            topic: "coffee".to_string(),
            style_hint: None,
        };
        assert_eq!(
            plain.prompt(),
            "Write a short Telegram channel post (2-4 sentences) on topic: coffee."
        );

        let styled = GenerationRequest::Post {
            topic: "coffee".to_string(),
            style_hint: Some("ironic".to_string()),
        };
        assert!(styled.prompt().ends_with(" Style: ironic."));
    }

    #[tokio::test]
    async fn test_static_post_placeholder() {
        let text = StaticFallbackGenerator
            .generate(&GenerationRequest::Post {
                topic: "coffee".to_string(),
                style_hint: None,
            })
            .await
            .unwrap();
        assert_eq!(
            text,
            "[AI placeholder] Post about: coffee. Style: default. Set OPENAI_API_KEY to enable real generation."
        );
    }

    #[test]
    fn test_static_multi_part_outputs_have_expected_line_counts() {
        let sandwich = StaticFallbackGenerator::render(&GenerationRequest::CommentSandwich {
            post_context: "Morning routines".to_string(),
        });
        assert_eq!(sandwich.lines().count(), 3);

        let templates = StaticFallbackGenerator::render(&GenerationRequest::ReputationReplies {
            negative_comment: "Slow delivery".to_string(),
        });
        assert_eq!(templates.lines().count(), 3);

        let replies = StaticFallbackGenerator::render(&GenerationRequest::PersonalReplies {
            base_comment: "See you at the stream".to_string(),
            count: 7,
        });
        let lines: Vec<&str> = replies.lines().collect();
        assert_eq!(lines.len(), 7);
        let unique: std::collections::HashSet<&&str> = lines.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("  short  ", 10), "short");
        assert_eq!(excerpt("Привет, мир", 6), "Привет...");
    }

    #[test]
    fn test_build_text_generator_without_key_is_static() {
        let generator = build_text_generator(&AppConfig::default());
        assert_eq!(generator.name(), "static");
    }
}
