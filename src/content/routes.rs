use super::handlers;
use axum::{routing::post, Router};

/// Creates the content generation router
pub fn content_routes() -> Router {
    Router::new()
        .route("/api/v1/content/generate-post", post(handlers::generate_post))
        .route("/api/v1/content/smart-sandwich", post(handlers::smart_sandwich))
        .route(
            "/api/v1/content/reputation-templates",
            post(handlers::reputation_templates),
        )
        .route(
            "/api/v1/content/mass-personal-reply",
            post(handlers::mass_personal_reply),
        )
}
