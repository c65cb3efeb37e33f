use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId};

use crate::core::AppResult;
use crate::i18n;
use crate::telegram::handlers::types::HandlerDeps;
use crate::telegram::{cb, Bot};

/// Shows the top-level category list. When `edit` carries a message id the
/// existing menu message is edited in place, otherwise a new one is sent.
pub async fn show_categories(
    bot: &Bot,
    chat_id: ChatId,
    edit: Option<MessageId>,
    user_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let categories = deps.store.categories(None).await?;

    let mut rows: Vec<Vec<_>> = categories
        .iter()
        .map(|c| vec![cb(c.name.clone(), format!("category:{}", c.id))])
        .collect();
    rows.push(vec![cb(i18n::t(&lang, "back-main-menu"), "main")]);
    let keyboard = InlineKeyboardMarkup::new(rows);

    let text = i18n::t(&lang, "categories-title");
    match edit {
        Some(message_id) => {
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
    }
    Ok(())
}

/// Shows one category: its subcategories, its products, and a per-category
/// search button. Edits the pressed menu message in place.
pub async fn show_category(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    category_id: i64,
    user_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(category) = deps.store.category_by_id(category_id).await? else {
        log::warn!("Callback for unknown category {}", category_id);
        return show_categories(bot, chat_id, Some(message_id), user_id, deps).await;
    };

    let subcategories = deps.store.categories(Some(category_id)).await?;
    let products = deps.store.browse_products(None, Some(category_id), None).await?;

    if subcategories.is_empty() && products.is_empty() {
        let keyboard =
            InlineKeyboardMarkup::new(vec![vec![cb(i18n::t(&lang, "back-categories"), "categories")]]);
        bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "category-empty"))
            .reply_markup(keyboard)
            .await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<_>> = subcategories
        .iter()
        .map(|c| vec![cb(c.name.clone(), format!("category:{}", c.id))])
        .collect();
    rows.extend(
        products
            .iter()
            .map(|p| vec![cb(p.name.clone(), format!("product:{}", p.id))]),
    );
    rows.push(vec![cb(
        i18n::t(&lang, "category-search-here"),
        format!("search_cat:{category_id}"),
    )]);
    rows.push(vec![cb(i18n::t(&lang, "back-categories"), "categories")]);

    let text = i18n::t_with(&lang, "category-products-header", &[("category", &category.name)]);
    bot.edit_message_text(chat_id, message_id, text)
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}
