//! Command handlers and free-text input handling
//!
//! Plain text with no pending state runs a catalog-wide search, so the chat
//! doubles as a search box.

use teloxide::prelude::*;
use teloxide::types::{ForceReply, InlineKeyboardMarkup, Message};

use crate::core::{config, AppResult};
use crate::i18n;
use crate::telegram::menu::cart_view::show_cart;
use crate::telegram::menu::categories::show_categories;
use crate::telegram::menu::main_menu::show_main_menu;
use crate::telegram::menu::orders::show_orders;
use crate::telegram::state::PendingInput;
use crate::telegram::{cb, Bot, Command};

use super::types::{message_user_id, register_user, HandlerDeps};

/// Dispatches a parsed bot command.
pub async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> AppResult<()> {
    register_user(deps, msg);
    let chat_id = msg.chat.id;
    let Some(user_id) = message_user_id(msg) else {
        log::warn!("Command {:?} in chat {} has no sender, ignoring", cmd, chat_id);
        return Ok(());
    };

    match cmd {
        Command::Start => handle_start_command(bot, chat_id, user_id, deps).await,
        Command::Menu => show_main_menu(bot, chat_id, user_id, deps).await,
        Command::Categories => show_categories(bot, chat_id, None, user_id, deps).await,
        Command::Cart => show_cart(bot, chat_id, user_id, deps).await,
        Command::Orders => show_orders(bot, chat_id, user_id, deps).await,
        Command::Search => prompt_search(bot, chat_id, user_id, deps, None).await,
        Command::Recommend => prompt_recommend(bot, chat_id, user_id, deps).await,
        Command::Help => handle_help_command(bot, chat_id, user_id, deps).await,
    }
}

async fn handle_start_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    bot.send_message(chat_id, i18n::t(&lang, "welcome")).await?;
    show_main_menu(bot, chat_id, user_id, deps).await
}

async fn handle_help_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    bot.send_message(chat_id, i18n::t(&lang, "help-text")).await?;
    Ok(())
}

/// Asks for a search query and arms the pending-input state, optionally
/// scoped to one category.
pub async fn prompt_search(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    deps: &HandlerDeps,
    category_id: Option<i64>,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let input = match category_id {
        Some(id) => PendingInput::SearchInCategory(id),
        None => PendingInput::Search,
    };
    deps.pending.set(chat_id.0, input);

    bot.send_message(chat_id, i18n::t(&lang, "search-prompt"))
        .reply_markup(ForceReply::new())
        .await?;
    Ok(())
}

/// Asks what the user is looking for and arms the recommendation state.
pub async fn prompt_recommend(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    if deps.recommender.is_none() {
        bot.send_message(chat_id, i18n::t(&lang, "recommend-disabled")).await?;
        return Ok(());
    }

    deps.pending.set(chat_id.0, PendingInput::Recommend);
    bot.send_message(chat_id, i18n::t(&lang, "recommend-prompt"))
        .reply_markup(ForceReply::new())
        .await?;
    Ok(())
}

/// Consumes a plain text message according to the chat's pending state;
/// without one, the text is treated as a search query.
pub async fn handle_free_text(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    register_user(deps, msg);
    let chat_id = msg.chat.id;
    let Some(user_id) = message_user_id(msg) else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match deps.pending.take(chat_id.0) {
        Some(PendingInput::SearchInCategory(category_id)) => {
            run_product_search(bot, chat_id, user_id, text, Some(category_id), deps).await
        }
        Some(PendingInput::Recommend) => run_recommendations(bot, chat_id, user_id, text, deps).await,
        Some(PendingInput::Search) | None => {
            run_product_search(bot, chat_id, user_id, text, None, deps).await
        }
    }
}

/// Searches the catalog and replies with one button per matching product.
pub async fn run_product_search(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    query: &str,
    category_id: Option<i64>,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let limit = config::catalog::search_result_limit();

    let products = deps
        .store
        .browse_products(Some(query), category_id, Some(limit))
        .await?;
    log::info!(
        "Search {:?} (category {:?}) from chat {}: {} result(s)",
        query,
        category_id,
        chat_id.0,
        products.len()
    );

    if products.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "search-empty")).await?;
        return Ok(());
    }

    let rows: Vec<Vec<_>> = products
        .iter()
        .map(|p| vec![cb(p.name.clone(), format!("product:{}", p.id))])
        .collect();
    bot.send_message(chat_id, i18n::t(&lang, "search-results"))
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Runs the LLM recommender; every failure degrades to the localized
/// "nothing found" reply.
pub async fn run_recommendations(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    request: &str,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(recommender) = deps.recommender.as_ref() else {
        bot.send_message(chat_id, i18n::t(&lang, "recommend-disabled")).await?;
        return Ok(());
    };

    let recommendations = match recommender.recommend(deps.store.as_ref(), request).await {
        Ok(recommendations) => recommendations,
        Err(e) => {
            log::error!("Error generating recommendations: {}", e);
            Vec::new()
        }
    };

    if recommendations.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "recommend-none")).await?;
        return Ok(());
    }

    let rows: Vec<Vec<_>> = recommendations
        .iter()
        .map(|r| vec![cb(format!("{}: {}", r.id, r.name), format!("product:{}", r.id))])
        .collect();
    bot.send_message(chat_id, i18n::t(&lang, "recommend-header"))
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}
