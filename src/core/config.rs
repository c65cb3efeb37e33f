use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Telegram bot token.
/// Read once at startup from the BOT_TELEGRAM_TOKEN environment variable.
/// Empty when unset; `main` refuses to start without it.
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| env::var("BOT_TELEGRAM_TOKEN").unwrap_or_default());

/// Payment provider token (Stripe, YooKassa, ...) for Telegram invoices.
/// Read from BOT_TELEGRAM_PAYMENT_PROVIDER_TOKEN. When unset, checkout is
/// disabled and the bot tells the user payments are not configured.
pub static PAYMENT_PROVIDER_TOKEN: Lazy<Option<String>> = Lazy::new(|| {
    env::var("BOT_TELEGRAM_PAYMENT_PROVIDER_TOKEN")
        .ok()
        .filter(|t| !t.is_empty())
});

/// Default interface language for users whose Telegram locale we don't support.
/// Read from BOT_TELEGRAM_LANGUAGE_CODE, defaults to "en".
pub static DEFAULT_LANGUAGE: Lazy<String> =
    Lazy::new(|| env::var("BOT_TELEGRAM_LANGUAGE_CODE").unwrap_or_else(|_| "en".to_string()));

/// SQLite database file path
/// Read from DATABASE_PATH environment variable
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "lavka.sqlite".to_string()));

/// How product images are presented on the product detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductImageView {
    /// All images at once as a Telegram media group
    Gallery,
    /// One photo with Previous/Next buttons that swap the media in place
    Carousel,
}

/// Product detail image presentation, read from PRODUCT_IMAGE_VIEW
/// ("gallery" or "carousel"). Defaults to the gallery.
pub static PRODUCT_IMAGE_VIEW: Lazy<ProductImageView> = Lazy::new(|| {
    match env::var("PRODUCT_IMAGE_VIEW").as_deref() {
        Ok("carousel") => ProductImageView::Carousel,
        _ => ProductImageView::Gallery,
    }
});

/// Telegram payments configuration
pub mod payment {
    use super::{env, Lazy};

    fn flag(var: &str, default: bool) -> bool {
        match env::var(var).as_deref() {
            Ok("0") | Ok("false") | Ok("no") => false,
            Ok("1") | Ok("true") | Ok("yes") => true,
            _ => default,
        }
    }

    /// Ask the payment provider for the customer's full name
    pub static NEED_NAME: Lazy<bool> = Lazy::new(|| flag("BOT_TELEGRAM_PAYMENT_NEED_NAME", true));

    /// Ask for a shipping address (physical goods)
    pub static NEED_SHIPPING_ADDRESS: Lazy<bool> =
        Lazy::new(|| flag("BOT_TELEGRAM_PAYMENT_NEED_SHIPPING_ADDRESS", true));

    /// Ask for a phone number
    pub static NEED_PHONE_NUMBER: Lazy<bool> = Lazy::new(|| flag("BOT_TELEGRAM_PAYMENT_NEED_PHONE_NUMBER", true));

    /// Ask for an email address
    pub static NEED_EMAIL: Lazy<bool> = Lazy::new(|| flag("BOT_TELEGRAM_PAYMENT_NEED_EMAIL", true));
}

/// LLM recommendation configuration
pub mod llm {
    use super::{env, Lazy};

    /// API key for the OpenAI-compatible endpoint. Recommendations are
    /// disabled when unset.
    pub static API_KEY: Lazy<Option<String>> =
        Lazy::new(|| env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()));

    /// Base URL of the chat-completions API
    pub static BASE_URL: Lazy<String> =
        Lazy::new(|| env::var("LLM_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string()));

    /// Model name
    pub static MODEL: Lazy<String> = Lazy::new(|| env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()));

    /// Sampling temperature
    pub static TEMPERATURE: Lazy<f32> = Lazy::new(|| {
        env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0.7)
    });

    /// Whether the recommendations feature is available at all
    pub fn enabled() -> bool {
        API_KEY.is_some()
    }
}

/// Catalog browsing configuration
pub mod catalog {
    use super::env;

    /// Maximum number of products shown for a search query
    pub const SEARCH_RESULT_LIMIT: usize = 10;

    /// Separator between product specification blocks in the LLM prompt
    pub const SPEC_SEPARATOR: &str = "\n\n--------------------\n\n";

    /// Search result limit, overridable via SEARCH_RESULT_LIMIT
    pub fn search_result_limit() -> usize {
        env::var("SEARCH_RESULT_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(SEARCH_RESULT_LIMIT)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for outgoing HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
