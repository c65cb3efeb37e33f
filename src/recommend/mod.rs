//! LLM-backed product recommendations
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. The whole feature
//! is optional: it only activates when `LLM_API_KEY` is set, and every failure
//! degrades to "no recommendations" instead of breaking the chat.

mod client;
mod prompt;

pub use client::{Recommendation, Recommender};
pub use prompt::{build_prompt, build_product_specs};
