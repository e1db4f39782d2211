// Common module - shared types and utilities across all modules

pub mod config;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod tariff;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{
    is_unique_violation, normalize_username, now_rfc3339, safe_token_log, username_key,
};
pub use id_generator::*;
pub use state::AppState;
pub use tariff::TariffTier;
pub use validation::{ValidationError, ValidationResult, Validator};
