// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing Telegram authentication when running outside a Mini App

use std::env;
use tracing::{info, warn};

use crate::auth::models::User;
use crate::common::tariff::TariffTier;

/// Fixed ID so every dev-mode request resolves to the same user row
pub const DEV_USER_ID: &str = "U_DEV00001";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub telegram_id: i64,
    pub username: String,
    pub tariff: TariffTier,
}

impl Default for DevModeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            telegram_id: 12345,
            username: "testuser".to_string(),
            tariff: TariffTier::Creator,
        }
    }
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let telegram_id = env::var("DEV_TELEGRAM_ID")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.telegram_id);

        let username = env::var("DEV_USERNAME").unwrap_or(defaults.username);

        let tariff = env::var("DEV_USER_TARIFF")
            .map(|v| TariffTier::from_stored(&v))
            .unwrap_or(defaults.tariff);

        Self {
            enabled,
            telegram_id,
            username,
            tariff,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Row inserted for the dev user the first time it is needed
    pub fn create_dev_user(&self) -> User {
        User {
            id: DEV_USER_ID.to_string(),
            telegram_id: self.telegram_id,
            username: Some(self.username.clone()),
            first_name: Some("Dev".to_string()),
            last_name: None,
            photo_url: None,
            tariff: self.tariff.as_str().to_string(),
            content_generations_used_this_week: 0,
            content_week_reset_at: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Log dev mode status on startup
pub fn log_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        warn!(
            telegram_id = config.telegram_id,
            username = %config.username,
            tariff = %config.tariff,
            "DEV MODE ENABLED - Telegram authentication bypassed, do not use in production"
        );
    } else {
        info!("Production mode - Telegram authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I: IntoIterator<Item = String>>(args: I) -> Option<bool> {
    let mut result = None;
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => result = Some(true),
            "--no-dev" | "--prod" | "--production" => result = Some(false),
            _ => {}
        }
    }
    result
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        info!(dev_mode = cli_dev_mode, "CLI override for DEV_MODE");
        config.enabled = cli_dev_mode;
    }

    config
}
