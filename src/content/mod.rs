//! # Content Module
//!
//! Text generation endpoints. Every call consumes one weekly generation from
//! the caller's tariff quota before any text is produced.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::content_routes;
