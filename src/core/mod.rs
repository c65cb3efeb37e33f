//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod money;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use money::format_price;
