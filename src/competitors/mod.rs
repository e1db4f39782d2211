//! # Competitors Module
//!
//! Competitor channels tracked against the caller's own channels:
//! - Adding competitors within the tariff competitor cap
//! - Niche benchmark and audience overlap
//! - Ad placement tracking

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::competitors_routes;
pub use services::CompetitorsService;
