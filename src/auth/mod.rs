//! # Auth Module
//!
//! This module handles Telegram authentication:
//! - Signature verification of login widget data and Mini App initData
//! - Access token (JWT) issuing and validation
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod init_data;
pub mod models;
pub mod routes;
pub mod services;
pub mod signature;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
