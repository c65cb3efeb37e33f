use chrono::NaiveDateTime;
use teloxide::prelude::*;

use crate::core::money::format_price;
use crate::core::AppResult;
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::handlers::types::HandlerDeps;
use crate::telegram::Bot;

const ORDER_HISTORY_LIMIT: usize = 10;

/// Lists the user's recent orders with their lines.
pub async fn show_orders(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);
    let conn = get_connection(&deps.db_pool)?;
    let orders = db::recent_orders(&conn, user_id, ORDER_HISTORY_LIMIT)?;

    if orders.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "orders-empty")).await?;
        return Ok(());
    }

    let mut text = i18n::t(&lang, "orders-title");
    text.push('\n');
    for order in &orders {
        text.push_str(&format!(
            "\n#{} | {} | {}\n",
            order.id,
            format_order_date(&order.created_at),
            format_price(order.total_cents, &order.currency)
        ));
        for item in db::order_items(&conn, order.id)? {
            text.push_str(&format!("  - {} x{}\n", item.name, item.quantity));
        }
    }

    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Formats the stored `datetime('now')` timestamp as a date. Falls back to
/// the raw value if it doesn't parse.
fn format_order_date(created_at: &str) -> String {
    NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_date_drops_the_time() {
        assert_eq!(format_order_date("2024-05-01 13:37:00"), "2024-05-01");
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(format_order_date("soon"), "soon");
    }
}
