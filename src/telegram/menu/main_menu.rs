use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;
use unic_langid::LanguageIdentifier;

use crate::core::AppResult;
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::handlers::types::HandlerDeps;
use crate::telegram::{cb, Bot};

/// Builds the main menu keyboard. The cart button carries a line-count badge
/// when the cart is not empty; the recommendations row only appears when the
/// feature is configured.
pub(crate) fn main_menu_keyboard(
    lang: &LanguageIdentifier,
    cart_lines: i64,
    recommendations_enabled: bool,
) -> InlineKeyboardMarkup {
    let cart_label = if cart_lines > 0 {
        i18n::t_with(lang, "cart-button-count", &[("count", &cart_lines.to_string())])
    } else {
        i18n::t(lang, "menu-cart")
    };

    let mut rows = vec![
        vec![cb(i18n::t(lang, "menu-categories"), "categories")],
        vec![cb(cart_label, "cart")],
        vec![cb(i18n::t(lang, "menu-orders"), "orders")],
        vec![cb(i18n::t(lang, "menu-search"), "search")],
    ];
    if recommendations_enabled {
        rows.push(vec![cb(i18n::t(lang, "menu-recommendations"), "recommend")]);
    }

    InlineKeyboardMarkup::new(rows)
}

/// Sends the main menu as a new message. The cart badge counts the sender's
/// own cart, which is keyed by user id, not by chat.
pub async fn show_main_menu(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let cart_lines = match get_connection(&deps.db_pool) {
        Ok(conn) => db::cart_line_count(&conn, user_id).unwrap_or(0),
        Err(e) => {
            log::error!("Failed to get DB connection for main menu: {}", e);
            0
        }
    };

    let keyboard = main_menu_keyboard(&lang, cart_lines, deps.recommender.is_some());
    bot.send_message(chat_id, i18n::t(&lang, "menu-title"))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}
