//! # Partners Module
//!
//! Cross-promotion between channels:
//! - Partner scouting
//! - Negotiation requests sent to other channels by username

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::partners_routes;
pub use services::NegotiationsService;
