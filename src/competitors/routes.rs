use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the competitors router
pub fn competitors_routes() -> Router {
    Router::new()
        .route(
            "/api/v1/competitors",
            get(handlers::list_competitors).post(handlers::add_competitor),
        )
        .route("/api/v1/competitors/benchmark", get(handlers::get_benchmark))
        .route("/api/v1/competitors/ads-tracker", get(handlers::get_ads_tracker))
        .route(
            "/api/v1/competitors/audience-overlap",
            get(handlers::get_audience_overlap),
        )
        .route("/api/v1/competitors/:id/ads", post(handlers::record_ad_activity))
}
