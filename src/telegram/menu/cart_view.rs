use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId};
use unic_langid::LanguageIdentifier;

use crate::cart::Cart;
use crate::core::AppResult;
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::handlers::types::HandlerDeps;
use crate::telegram::menu::main_menu::show_main_menu;
use crate::telegram::{cb, Bot};

fn cart_item_text(product_id: i64, name: &str, quantity: i64) -> String {
    format!("#{product_id} {name}: {quantity}")
}

fn cart_item_keyboard(lang: &LanguageIdentifier, product_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        cb("+", format!("cart:inc:{product_id}")),
        cb("−", format!("cart:dec:{product_id}")),
        cb(i18n::t(lang, "cart-remove"), format!("cart:rm:{product_id}")),
    ]])
}

/// Shows the cart scene: one editable message per line, then the summary
/// with checkout controls.
pub async fn show_cart(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let cart = Cart::load(&deps.db_pool, user_id, deps.store.as_ref()).await?;

    if cart.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "cart-empty")).await?;
        return Ok(());
    }

    for line in &cart.lines {
        bot.send_message(
            chat_id,
            cart_item_text(line.product.id, &line.product.name, line.quantity),
        )
        .reply_markup(cart_item_keyboard(&lang, line.product.id))
        .await?;
    }

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![cb(i18n::t(&lang, "cart-checkout"), "checkout")],
        vec![cb(i18n::t(&lang, "cart-clear-button"), "cart:clear")],
        vec![cb(i18n::t(&lang, "back-main-menu"), "main")],
    ]);
    bot.send_message(chat_id, cart.summary(&lang, "cart-header"))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// "Add to cart" from the product detail: adds one unit and confirms with a
/// quick-access keyboard (cart badge + the product's category).
pub async fn add_to_cart_and_notify(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    product_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(product) = deps.store.product_by_id(product_id).await? else {
        let text = i18n::t_with(&lang, "product-not-found", &[("id", &product_id.to_string())]);
        bot.send_message(chat_id, text).await?;
        return Ok(());
    };

    let cart_lines = {
        let conn = get_connection(&deps.db_pool)?;
        db::cart_add_item(&conn, user_id, product_id, None, 1)?;
        db::cart_line_count(&conn, user_id)?
    };

    let mut quick_row = vec![cb(
        i18n::t_with(&lang, "cart-button-count", &[("count", &cart_lines.to_string())]),
        "cart",
    )];
    if let Some(category) = deps.store.category_by_id(product.category_id).await? {
        quick_row.push(cb(category.name, format!("category:{}", category.id)));
    }

    let text = i18n::t_with(
        &lang,
        "product-added",
        &[("id", &product.id.to_string()), ("name", &product.name)],
    );
    bot.send_message(chat_id, text)
        .reply_markup(InlineKeyboardMarkup::new(vec![quick_row]))
        .await?;
    Ok(())
}

/// The `+` button: bumps the line by one and updates the item message.
pub async fn increment_item(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: i64,
    product_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let quantity = {
        let conn = get_connection(&deps.db_pool)?;
        db::cart_add_item(&conn, user_id, product_id, None, 1)?
    };

    let name = product_name(deps, product_id).await?;
    bot.edit_message_text(chat_id, message_id, cart_item_text(product_id, &name, quantity))
        .reply_markup(cart_item_keyboard(&lang, product_id))
        .await?;
    Ok(())
}

/// The `−` button: drops the line by one; deleting the message when the last
/// unit goes.
pub async fn decrement_item(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: i64,
    product_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let remaining = {
        let conn = get_connection(&deps.db_pool)?;
        db::cart_remove_item(&conn, user_id, product_id, 1)?
    };

    match remaining {
        Some(quantity) => {
            let name = product_name(deps, product_id).await?;
            bot.edit_message_text(chat_id, message_id, cart_item_text(product_id, &name, quantity))
                .reply_markup(cart_item_keyboard(&lang, product_id))
                .await?;
        }
        None => {
            bot.delete_message(chat_id, message_id).await?;
        }
    }
    Ok(())
}

/// The Remove button: drops the whole line.
pub async fn remove_product(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: i64,
    product_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let found = {
        let conn = get_connection(&deps.db_pool)?;
        db::cart_remove_product(&conn, user_id, product_id)?
    };

    bot.delete_message(chat_id, message_id).await?;
    let key = if found { "cart-item-removed" } else { "cart-item-not-found" };
    bot.send_message(chat_id, i18n::t(&lang, key)).await?;
    Ok(())
}

/// Empties the cart and returns to the main menu.
pub async fn clear_cart(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    {
        let conn = get_connection(&deps.db_pool)?;
        db::cart_clear(&conn, user_id)?;
    }

    bot.send_message(chat_id, i18n::t(&lang, "cart-cleared")).await?;
    show_main_menu(bot, chat_id, user_id, deps).await
}

async fn product_name(deps: &HandlerDeps, product_id: i64) -> AppResult<String> {
    Ok(deps
        .store
        .product_by_id(product_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_else(|| format!("#{product_id}")))
}
