//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/v1/auth/telegram` - Telegram login widget / Mini App authentication
/// - `GET /api/v1/auth/me` - Current user, tariff and quota usage
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/v1/auth/telegram", post(handlers::telegram_login))
        .route("/api/v1/auth/me", get(handlers::me_handler))
}
