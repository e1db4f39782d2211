use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the partners router
pub fn partners_routes() -> Router {
    Router::new()
        .route("/api/v1/partners/scout", get(handlers::scout_partners))
        .route(
            "/api/v1/partners/negotiation",
            get(handlers::list_negotiations).post(handlers::create_negotiation),
        )
        .route(
            "/api/v1/partners/negotiation/:id/accept",
            post(handlers::accept_negotiation),
        )
        .route(
            "/api/v1/partners/negotiation/:id/decline",
            post(handlers::decline_negotiation),
        )
}
