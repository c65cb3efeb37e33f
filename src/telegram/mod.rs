//! Telegram bot surface: commands, menus, callbacks, payments

pub mod bot;
pub mod handlers;
pub mod menu;
pub mod state;

use teloxide::types::InlineKeyboardButton;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::schema;
pub use handlers::types::{HandlerDeps, HandlerError};
pub use menu::{handle_menu_callback, show_main_menu};

/// The bot type used throughout the crate.
pub type Bot = teloxide::Bot;

/// Shorthand for an inline callback button.
pub fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), data.into())
}

/// Escapes text for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_entities() {
        assert_eq!(escape_html("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
        assert_eq!(escape_html("plain"), "plain");
    }
}
