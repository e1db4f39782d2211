// src/common/config.rs
//! Process configuration, read once at startup and threaded through `AppState`

use std::env;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "growthkit-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub telegram_bot_token: String,
    /// Maximum accepted age of `auth_date` in seconds; 0 disables the check
    pub auth_max_age_secs: i64,
    pub access_token_ttl_days: i64,
    pub openai: Option<OpenAISettings>,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub sentry_dsn: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAISettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://growthkit.db".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            telegram_bot_token: String::new(),
            auth_max_age_secs: 86_400,
            access_token_ttl_days: 30,
            openai: None,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
                "http://localhost:5173".to_string(),
            ],
            port: 8000,
            sentry_dsn: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        // JWT_SECRET wins over the legacy SECRET_KEY name
        if let Some(secret) = non_empty_var("JWT_SECRET").or_else(|| non_empty_var("SECRET_KEY")) {
            config.jwt_secret = secret;
        } else {
            warn!("JWT_SECRET not set, using the built-in development secret");
        }

        if let Some(token) = non_empty_var("TELEGRAM_BOT_TOKEN") {
            config.telegram_bot_token = token;
        } else {
            warn!("TELEGRAM_BOT_TOKEN not set, Telegram logins will be rejected");
        }

        if let Some(age) = parse_var::<i64>("TELEGRAM_AUTH_MAX_AGE_SECS") {
            config.auth_max_age_secs = age.max(0);
        }

        if let Some(days) = parse_var::<i64>("ACCESS_TOKEN_TTL_DAYS") {
            if days > 0 {
                config.access_token_ttl_days = days;
            }
        }

        config.openai = non_empty_var("OPENAI_API_KEY").map(|api_key| OpenAISettings {
            api_key,
            model: non_empty_var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: non_empty_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
        });

        if let Some(origins) = non_empty_var("CORS_ORIGINS") {
            config.cors_origins = split_list(&origins);
        }

        if let Some(port) = parse_var::<u16>("PORT") {
            config.port = port;
        }

        config.sentry_dsn = non_empty_var("SENTRY_DSN");

        config
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = non_empty_var(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = %key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

/// Splits a comma-separated list, dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.access_token_ttl_days, 30);
        assert_eq!(config.auth_max_age_secs, 86_400);
        assert!(config.openai.is_none());
        assert!(config.uses_default_jwt_secret());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
