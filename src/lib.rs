//! Telegram e-commerce bot
//!
//! Category browsing, product detail with image galleries, a persistent
//! shopping cart, checkout through Telegram payments, and optional
//! LLM-backed product recommendations on top of a pluggable catalog backend.

pub mod cart;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod i18n;
pub mod recommend;
pub mod storage;
pub mod telegram;

pub use crate::core::{AppError, AppResult};
