// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::services::{QuotaService, TextGenerator};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub dev_mode: DevModeConfig,
    pub text_generator: Arc<dyn TextGenerator>,
    pub quota_service: Arc<QuotaService>,
}
