//! # Channels Module
//!
//! Telegram channels connected by users:
//! - Connecting a channel within the tariff channel cap
//! - Searching the caller's own channels
//! - Ownership lookups shared by the analytics, competitors and partners modules

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::Channel;
pub use routes::channels_routes;
pub use services::ChannelsService;
