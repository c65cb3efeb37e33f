//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, PreCheckoutQuery};

use super::commands::{handle_command, handle_free_text};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::menu::checkout::{handle_pre_checkout, handle_successful_payment};
use crate::telegram::{handle_menu_callback, Bot, Command};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same handler tree serves production and integration tests. Branch
/// order matters: successful payments must be consumed before the generic
/// message branches see them.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_payment = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_precheckout = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Successful payment handler must be first
        .branch(successful_payment_handler(deps_payment))
        // Command handler
        .branch(command_handler(deps_commands))
        // Free text: pending search/recommend input, or default search
        .branch(message_handler(deps_messages))
        // Pre-checkout query handler
        .branch(pre_checkout_handler(deps_precheckout))
        // Callback query handler
        .branch(callback_handler(deps_callback))
}

/// Handler for successful Telegram payments
fn successful_payment_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                log::info!("Received successful_payment message");
                if let Err(e) = handle_successful_payment(&bot, &msg, &deps).await {
                    log::error!("Failed to handle successful payment: {:?}", e);
                }
                Ok(())
            }
        })
}

/// Handler for bot commands (/start, /cart, /search, etc.)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                if let Err(e) = handle_command(&bot, &msg, cmd, &deps).await {
                    log::error!("Command handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        },
    ))
}

/// Handler for plain text messages
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_free_text(&bot, &msg, &deps).await {
                    log::error!("Text handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for pre-checkout queries (Telegram payments)
fn pre_checkout_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_pre_checkout_query().endpoint(move |bot: Bot, query: PreCheckoutQuery| {
        let deps = deps.clone();
        async move {
            log::info!(
                "Received pre_checkout_query: id={}, payload={}",
                query.id,
                query.invoice_payload
            );
            if let Err(e) = handle_pre_checkout(&bot, &query, &deps).await {
                log::error!("Failed to answer pre_checkout_query: {:?}", e);
            }
            Ok(())
        }
    })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_menu_callback(bot, q, deps).await {
                log::error!("Callback handler failed: {}", e);
            }
            Ok(())
        }
    })
}
