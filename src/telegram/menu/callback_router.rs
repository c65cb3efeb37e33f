//! Routes inline keyboard callbacks by their `"prefix:argument"` data.

use teloxide::prelude::*;

use crate::core::AppResult;
use crate::telegram::handlers::commands::{prompt_recommend, prompt_search};
use crate::telegram::handlers::types::HandlerDeps;
use crate::telegram::Bot;

use super::cart_view;
use super::categories::{show_categories, show_category};
use super::checkout::{send_cart_invoice, show_checkout};
use super::main_menu::show_main_menu;
use super::orders::show_orders;
use super::product::{change_carousel_image, show_product};

/// Handles a callback query from any of the bot's inline keyboards. Cart and
/// order actions run against the pressing user's data, not the chat's.
pub async fn handle_menu_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> AppResult<()> {
    // Stop the button spinner right away
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        log::warn!("Callback {:?} without an attached message", data);
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();
    let user_id = i64::try_from(q.from.id.0).unwrap_or(0);

    log::debug!("Callback from user {} in chat {}: {}", user_id, chat_id.0, data);

    match data {
        "main" => show_main_menu(&bot, chat_id, user_id, &deps).await,
        "categories" => show_categories(&bot, chat_id, Some(message_id), user_id, &deps).await,
        "cart" => cart_view::show_cart(&bot, chat_id, user_id, &deps).await,
        "cart:clear" => cart_view::clear_cart(&bot, chat_id, user_id, &deps).await,
        "orders" => show_orders(&bot, chat_id, user_id, &deps).await,
        "checkout" => show_checkout(&bot, chat_id, user_id, &deps).await,
        "pay" => send_cart_invoice(&bot, chat_id, user_id, &deps).await,
        "search" => prompt_search(&bot, chat_id, user_id, &deps, None).await,
        "recommend" => prompt_recommend(&bot, chat_id, user_id, &deps).await,
        _ => {
            if let Some(id) = parse_id(data, "category:") {
                show_category(&bot, chat_id, message_id, id, user_id, &deps).await
            } else if let Some(id) = parse_id(data, "product:") {
                show_product(&bot, chat_id, user_id, id, &deps).await
            } else if let Some(id) = parse_id(data, "cart:add:") {
                cart_view::add_to_cart_and_notify(&bot, chat_id, user_id, id, &deps).await
            } else if let Some(id) = parse_id(data, "cart:inc:") {
                cart_view::increment_item(&bot, chat_id, message_id, user_id, id, &deps).await
            } else if let Some(id) = parse_id(data, "cart:dec:") {
                cart_view::decrement_item(&bot, chat_id, message_id, user_id, id, &deps).await
            } else if let Some(id) = parse_id(data, "cart:rm:") {
                cart_view::remove_product(&bot, chat_id, message_id, user_id, id, &deps).await
            } else if let Some(id) = parse_id(data, "search_cat:") {
                prompt_search(&bot, chat_id, user_id, &deps, Some(id)).await
            } else if let Some((product_id, index)) = parse_carousel(data) {
                change_carousel_image(&bot, chat_id, message_id, user_id, product_id, index, &deps).await
            } else {
                log::warn!("Unknown callback data: {}", data);
                Ok(())
            }
        }
    }
}

fn parse_id(data: &str, prefix: &str) -> Option<i64> {
    data.strip_prefix(prefix)?.parse().ok()
}

/// `carousel:<product_id>:<image_index>`; a negative index clamps to 0.
fn parse_carousel(data: &str) -> Option<(i64, usize)> {
    let rest = data.strip_prefix("carousel:")?;
    let (product_id, index) = rest.split_once(':')?;
    let product_id = product_id.parse().ok()?;
    let index = index.parse::<i64>().ok()?.max(0);
    Some((product_id, index as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_ids() {
        assert_eq!(parse_id("category:12", "category:"), Some(12));
        assert_eq!(parse_id("product:7", "product:"), Some(7));
        assert_eq!(parse_id("category:x", "category:"), None);
        assert_eq!(parse_id("product:7", "category:"), None);
    }

    #[test]
    fn parses_carousel_data() {
        assert_eq!(parse_carousel("carousel:5:2"), Some((5, 2)));
        assert_eq!(parse_carousel("carousel:5:-1"), Some((5, 0)));
        assert_eq!(parse_carousel("carousel:5"), None);
        assert_eq!(parse_carousel("cart:5:2"), None);
    }
}
