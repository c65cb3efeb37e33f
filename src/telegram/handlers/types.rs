//! Handler types, dependencies, and user registration helpers

use std::sync::Arc;

use teloxide::types::Message;

use crate::catalog::Ecommerce;
use crate::i18n;
use crate::recommend::Recommender;
use crate::storage::db::{self, DbPool};
use crate::storage::get_connection;
use crate::telegram::state::PendingInputs;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub store: Arc<dyn Ecommerce>,
    pub recommender: Option<Arc<Recommender>>,
    pub pending: Arc<PendingInputs>,
}

impl HandlerDeps {
    pub fn new(
        db_pool: Arc<DbPool>,
        store: Arc<dyn Ecommerce>,
        recommender: Option<Arc<Recommender>>,
    ) -> Self {
        Self {
            db_pool,
            store,
            recommender,
            pending: Arc::new(PendingInputs::new()),
        }
    }
}

/// The sender's Telegram user id. Users, carts, and orders are keyed by it,
/// never by the chat id: in group chats the two differ and each member keeps
/// their own cart.
pub fn message_user_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok())
}

/// Registers the message's sender in the database, picking their language
/// from Telegram on first contact. Errors are logged, not propagated; a
/// failed registration must not break the interaction.
pub fn register_user(deps: &HandlerDeps, msg: &Message) {
    let Some(from) = msg.from.as_ref() else {
        return;
    };
    let Ok(telegram_id) = i64::try_from(from.id.0) else {
        return;
    };
    let username = from.username.as_deref();
    let language = i18n::resolve_language(None, from.language_code.as_deref());

    match get_connection(&deps.db_pool) {
        Ok(conn) => {
            match db::ensure_user(&conn, telegram_id, username, &language) {
                Ok(true) => log::info!("New user {} ({:?})", telegram_id, username),
                Ok(false) => {}
                Err(e) => log::error!("Failed to register user {}: {}", telegram_id, e),
            }
        }
        Err(e) => log::error!("Failed to get DB connection: {}", e),
    }
}
