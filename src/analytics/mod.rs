//! # Analytics Module
//!
//! Channel dashboards built from recorded stats snapshots:
//! - 7-day subscriber growth and engagement rate
//! - Posting-time heatmap
//! - Estimated audience psychographics

pub mod handlers;
pub mod heatmap;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::analytics_routes;
