// src/services/mod.rs
//
// Shared services used across domain modules

pub mod monitoring;
pub mod quota;
pub mod text_generator;

// Re-export commonly used types for convenience
pub use quota::{QuotaService, QuotaUsage};
pub use text_generator::{
    build_text_generator, GenerationRequest, StaticFallbackGenerator, TextGenerator,
};
