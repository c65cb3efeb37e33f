//! Checkout and Telegram payments
//!
//! The flow is invoice -> pre-checkout -> successful payment. Pre-checkout is
//! validated against the cart as currently stored, not against what the
//! invoice said: if the cart changed between the two, the payment is refused.

use std::ops::DerefMut;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, LabeledPrice, Message, PreCheckoutQuery};
use uuid::Uuid;

use crate::cart::Cart;
use crate::core::{config, AppResult};
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::handlers::types::{message_user_id, HandlerDeps};
use crate::telegram::menu::main_menu::show_main_menu;
use crate::telegram::{cb, Bot};

/// Shows the checkout summary with the "Pay now" button.
pub async fn show_checkout(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let cart = Cart::load(&deps.db_pool, user_id, deps.store.as_ref()).await?;

    if cart.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "checkout-empty")).await?;
        return show_main_menu(bot, chat_id, user_id, deps).await;
    }

    bot.send_message(chat_id, cart.summary(&lang, "checkout-header")).await?;

    let keyboard = InlineKeyboardMarkup::new(vec![vec![cb(i18n::t(&lang, "checkout-pay"), "pay")]]);
    bot.send_message(chat_id, i18n::t(&lang, "checkout-proceed"))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// One labeled price per cart line, amounts in minor units as the payments
/// API wants them.
fn invoice_prices(cart: &Cart) -> Vec<LabeledPrice> {
    cart.lines
        .iter()
        .map(|line| {
            LabeledPrice::new(
                format!("{} x{}", line.product.name, line.quantity),
                u32::try_from(line.total_cents()).unwrap_or(u32::MAX),
            )
        })
        .collect()
}

fn order_payload(user_id: i64) -> String {
    format!("order:{}:{}", user_id, Uuid::new_v4())
}

/// Sends the invoice for the current cart, one labeled price per line.
pub async fn send_cart_invoice(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(provider_token) = config::PAYMENT_PROVIDER_TOKEN.clone() else {
        bot.send_message(chat_id, i18n::t(&lang, "payments-disabled")).await?;
        return Ok(());
    };

    let cart = Cart::load(&deps.db_pool, user_id, deps.store.as_ref()).await?;
    if cart.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "cart-empty")).await?;
        return Ok(());
    }

    let prices = invoice_prices(&cart);
    let payload = order_payload(user_id);
    log::info!("Sending invoice for user {}: payload={}", user_id, payload);

    bot.send_invoice(
        chat_id,
        i18n::t(&lang, "invoice-title"),
        i18n::t(&lang, "invoice-description"),
        payload,
        cart.currency.clone(),
        prices,
    )
    .provider_token(provider_token)
    .need_name(*config::payment::NEED_NAME)
    .need_shipping_address(*config::payment::NEED_SHIPPING_ADDRESS)
    .need_phone_number(*config::payment::NEED_PHONE_NUMBER)
    .need_email(*config::payment::NEED_EMAIL)
    .is_flexible(false)
    .await?;
    Ok(())
}

/// Parses an `order:<user_id>:<uuid>` invoice payload.
fn parse_order_payload(payload: &str) -> Option<i64> {
    let rest = payload.strip_prefix("order:")?;
    let (user_id, uuid) = rest.split_once(':')?;
    Uuid::parse_str(uuid).ok()?;
    user_id.parse().ok()
}

/// Approves a pre-checkout query only when the payload parses, belongs to the
/// paying user, and the charged total matches the cart as stored right now.
pub async fn handle_pre_checkout(bot: &Bot, query: &PreCheckoutQuery, deps: &HandlerDeps) -> AppResult<()> {
    let user_id = i64::try_from(query.from.id.0).unwrap_or(0);
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(payload_user) = parse_order_payload(&query.invoice_payload) else {
        log::warn!("Rejecting pre-checkout with bad payload: {}", query.invoice_payload);
        bot.answer_pre_checkout_query(query.id.clone(), false)
            .error_message(i18n::t(&lang, "payment-invalid-payload"))
            .await?;
        return Ok(());
    };

    let cart = Cart::load(&deps.db_pool, user_id, deps.store.as_ref()).await?;

    if payload_user != user_id || i64::from(query.total_amount) != cart.total_cents() {
        log::warn!(
            "Rejecting pre-checkout for user {}: charged {} but cart totals {}",
            user_id,
            query.total_amount,
            cart.total_cents()
        );
        bot.answer_pre_checkout_query(query.id.clone(), false)
            .error_message(i18n::t(&lang, "payment-price-mismatch"))
            .await?;
        return Ok(());
    }

    bot.answer_pre_checkout_query(query.id.clone(), true).await?;
    log::info!("Pre-checkout approved for user {} ({})", user_id, query.invoice_payload);
    Ok(())
}

/// Records the order, clears the cart, thanks the user.
pub async fn handle_successful_payment(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let Some(payment) = msg.successful_payment() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let Some(user_id) = message_user_id(msg) else {
        log::warn!("Successful payment in chat {} without a sender", chat_id);
        return Ok(());
    };
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    log::info!(
        "Successful payment from user {}: {} {} ({})",
        user_id,
        payment.total_amount,
        payment.currency,
        payment.invoice_payload
    );

    let cart = Cart::load(&deps.db_pool, user_id, deps.store.as_ref()).await?;
    let order_id = {
        let mut conn = get_connection(&deps.db_pool)?;
        let order_id = db::create_order(
            conn.deref_mut(),
            user_id,
            &payment.invoice_payload,
            i64::from(payment.total_amount),
            &payment.currency.to_string(),
            Some(payment.telegram_payment_charge_id.0.as_str()),
            &cart.to_order_items(),
        )?;
        db::cart_clear(&conn, user_id)?;
        order_id
    };
    log::info!("Recorded order {} for user {}", order_id, user_id);

    bot.send_message(chat_id, i18n::t(&lang, "payment-success")).await?;
    show_main_menu(bot, chat_id, user_id, deps).await
}
