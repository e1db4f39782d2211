use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the analytics router
pub fn analytics_routes() -> Router {
    Router::new()
        .route("/api/v1/analytics/dashboard", get(handlers::get_dashboard))
        .route("/api/v1/analytics/channel/:id", get(handlers::get_channel_stats))
        .route(
            "/api/v1/analytics/channel/:id/snapshots",
            post(handlers::record_snapshot),
        )
        .route("/api/v1/analytics/channel/:id/heatmap", get(handlers::get_heatmap))
        .route(
            "/api/v1/analytics/channel/:id/psychographic",
            get(handlers::get_psychographic),
        )
}
