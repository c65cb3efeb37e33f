use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::{AppError, AppResult};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// A user known to the bot.
#[derive(Debug, Clone)]
pub struct User {
    /// Telegram user id
    pub telegram_id: i64,
    /// Telegram username, when available
    pub username: Option<String>,
    /// Preferred interface language code ("en", "ru", ...)
    pub language: String,
}

/// One cart line as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i64,
}

/// A completed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Invoice payload the payment was matched by
    pub payload: String,
    pub total_cents: i64,
    pub currency: String,
    /// Telegram payment charge id
    pub charge_id: Option<String>,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// A line of a completed order. Name and unit price are denormalized so the
/// order history stays readable even if the catalog changes.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and ensures the
/// schema exists.
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    pool.get().map_err(AppError::from)
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            telegram_id INTEGER PRIMARY KEY,
            username    TEXT,
            language    TEXT NOT NULL DEFAULT 'en',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS cart_items (
            user_id    INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            variant_id INTEGER,
            quantity   INTEGER NOT NULL CHECK (quantity > 0),
            PRIMARY KEY (user_id, product_id)
        );
        CREATE TABLE IF NOT EXISTS orders (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL,
            payload     TEXT NOT NULL,
            total_cents INTEGER NOT NULL,
            currency    TEXT NOT NULL,
            charge_id   TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS order_items (
            order_id         INTEGER NOT NULL REFERENCES orders(id),
            product_id       INTEGER NOT NULL,
            name             TEXT NOT NULL,
            quantity         INTEGER NOT NULL,
            unit_price_cents INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id, created_at);",
    )?;
    Ok(())
}

// ─── users ───────────────────────────────────────────────────────────

/// Creates the user if they don't exist yet. Returns true when a new row was
/// inserted.
pub fn ensure_user(
    conn: &Connection,
    telegram_id: i64,
    username: Option<&str>,
    language: &str,
) -> AppResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (telegram_id, username, language) VALUES (?1, ?2, ?3)",
        params![telegram_id, username, language],
    )?;
    if inserted == 0 {
        // Keep the username fresh for existing users
        conn.execute(
            "UPDATE users SET username = ?2 WHERE telegram_id = ?1 AND ?2 IS NOT NULL",
            params![telegram_id, username],
        )?;
    }
    Ok(inserted > 0)
}

pub fn get_user(conn: &Connection, telegram_id: i64) -> AppResult<Option<User>> {
    conn.query_row(
        "SELECT telegram_id, username, language FROM users WHERE telegram_id = ?1",
        params![telegram_id],
        |row| {
            Ok(User {
                telegram_id: row.get(0)?,
                username: row.get(1)?,
                language: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(AppError::from)
}

pub fn get_user_language(conn: &Connection, telegram_id: i64) -> AppResult<String> {
    conn.query_row(
        "SELECT language FROM users WHERE telegram_id = ?1",
        params![telegram_id],
        |row| row.get(0),
    )
    .map_err(AppError::from)
}

pub fn set_user_language(conn: &Connection, telegram_id: i64, language: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET language = ?2 WHERE telegram_id = ?1",
        params![telegram_id, language],
    )?;
    Ok(())
}

// ─── cart ────────────────────────────────────────────────────────────

/// Adds `quantity` units of a product to the user's cart, merging with an
/// existing line. Returns the new line quantity.
pub fn cart_add_item(
    conn: &Connection,
    user_id: i64,
    product_id: i64,
    variant_id: Option<i64>,
    quantity: i64,
) -> AppResult<i64> {
    if quantity <= 0 {
        return Err(AppError::Validation(format!("invalid quantity: {quantity}")));
    }
    conn.execute(
        "INSERT INTO cart_items (user_id, product_id, variant_id, quantity)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (user_id, product_id)
         DO UPDATE SET quantity = quantity + excluded.quantity",
        params![user_id, product_id, variant_id, quantity],
    )?;
    conn.query_row(
        "SELECT quantity FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
        params![user_id, product_id],
        |row| row.get(0),
    )
    .map_err(AppError::from)
}

/// Removes `quantity` units of a product. When the line drops to zero it is
/// deleted and `Ok(None)` is returned; otherwise the remaining quantity.
/// `Ok(None)` is also returned when the product was not in the cart.
pub fn cart_remove_item(
    conn: &Connection,
    user_id: i64,
    product_id: i64,
    quantity: i64,
) -> AppResult<Option<i64>> {
    let current: Option<i64> = conn
        .query_row(
            "SELECT quantity FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id],
            |row| row.get(0),
        )
        .optional()?;

    match current {
        None => Ok(None),
        Some(current) if current <= quantity => {
            conn.execute(
                "DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
                params![user_id, product_id],
            )?;
            Ok(None)
        }
        Some(current) => {
            let remaining = current - quantity;
            conn.execute(
                "UPDATE cart_items SET quantity = ?3 WHERE user_id = ?1 AND product_id = ?2",
                params![user_id, product_id, remaining],
            )?;
            Ok(Some(remaining))
        }
    }
}

/// Drops a whole cart line regardless of quantity. Returns whether the
/// product was present.
pub fn cart_remove_product(conn: &Connection, user_id: i64, product_id: i64) -> AppResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
        params![user_id, product_id],
    )?;
    Ok(deleted > 0)
}

pub fn cart_clear(conn: &Connection, user_id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM cart_items WHERE user_id = ?1", params![user_id])?;
    Ok(())
}

pub fn cart_items(conn: &Connection, user_id: i64) -> AppResult<Vec<CartItem>> {
    let mut stmt = conn.prepare(
        "SELECT product_id, variant_id, quantity FROM cart_items
         WHERE user_id = ?1 ORDER BY product_id",
    )?;
    let items = stmt
        .query_map(params![user_id], |row| {
            Ok(CartItem {
                product_id: row.get(0)?,
                variant_id: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Number of distinct cart lines (not unit count), matching what the cart
/// badge shows.
pub fn cart_line_count(conn: &Connection, user_id: i64) -> AppResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM cart_items WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
    .map_err(AppError::from)
}

pub fn cart_has_product(conn: &Connection, user_id: i64, product_id: i64) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
        params![user_id, product_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ─── orders ──────────────────────────────────────────────────────────

/// Records a completed order with its lines. Returns the order id.
pub fn create_order(
    conn: &mut Connection,
    user_id: i64,
    payload: &str,
    total_cents: i64,
    currency: &str,
    charge_id: Option<&str>,
    items: &[OrderItem],
) -> AppResult<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO orders (user_id, payload, total_cents, currency, charge_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, payload, total_cents, currency, charge_id],
    )?;
    let order_id = tx.last_insert_rowid();
    for item in items {
        tx.execute(
            "INSERT INTO order_items (order_id, product_id, name, quantity, unit_price_cents)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![order_id, item.product_id, item.name, item.quantity, item.unit_price_cents],
        )?;
    }
    tx.commit()?;
    Ok(order_id)
}

/// The user's most recent orders, newest first.
pub fn recent_orders(conn: &Connection, user_id: i64, limit: usize) -> AppResult<Vec<Order>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, payload, total_cents, currency, charge_id, created_at
         FROM orders WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
    )?;
    let orders = stmt
        .query_map(params![user_id, limit as i64], |row| {
            Ok(Order {
                id: row.get(0)?,
                user_id: row.get(1)?,
                payload: row.get(2)?,
                total_cents: row.get(3)?,
                currency: row.get(4)?,
                charge_id: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(orders)
}

pub fn order_items(conn: &Connection, order_id: i64) -> AppResult<Vec<OrderItem>> {
    let mut stmt = conn.prepare(
        "SELECT product_id, name, quantity, unit_price_cents
         FROM order_items WHERE order_id = ?1",
    )?;
    let items = stmt
        .query_map(params![order_id], |row| {
            Ok(OrderItem {
                product_id: row.get(0)?,
                name: row.get(1)?,
                quantity: row.get(2)?,
                unit_price_cents: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn ensure_user_is_idempotent() {
        let conn = test_conn();
        assert!(ensure_user(&conn, 42, Some("alice"), "en").unwrap());
        assert!(!ensure_user(&conn, 42, Some("alice"), "en").unwrap());

        let user = get_user(&conn, 42).unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.language, "en");
    }

    #[test]
    fn language_roundtrip() {
        let conn = test_conn();
        ensure_user(&conn, 1, None, "en").unwrap();
        set_user_language(&conn, 1, "ru").unwrap();
        assert_eq!(get_user_language(&conn, 1).unwrap(), "ru");
    }

    #[test]
    fn cart_add_merges_quantities() {
        let conn = test_conn();
        assert_eq!(cart_add_item(&conn, 1, 10, None, 1).unwrap(), 1);
        assert_eq!(cart_add_item(&conn, 1, 10, None, 2).unwrap(), 3);
        assert_eq!(cart_line_count(&conn, 1).unwrap(), 1);
        assert!(cart_has_product(&conn, 1, 10).unwrap());
        assert!(!cart_has_product(&conn, 1, 11).unwrap());
    }

    #[test]
    fn cart_add_rejects_nonpositive_quantity() {
        let conn = test_conn();
        assert!(cart_add_item(&conn, 1, 10, None, 0).is_err());
        assert!(cart_add_item(&conn, 1, 10, None, -2).is_err());
    }

    #[test]
    fn cart_remove_decrements_and_deletes() {
        let conn = test_conn();
        cart_add_item(&conn, 1, 10, None, 3).unwrap();

        assert_eq!(cart_remove_item(&conn, 1, 10, 1).unwrap(), Some(2));
        assert_eq!(cart_remove_item(&conn, 1, 10, 2).unwrap(), None);
        assert!(!cart_has_product(&conn, 1, 10).unwrap());

        // Removing from an empty cart is not an error
        assert_eq!(cart_remove_item(&conn, 1, 10, 1).unwrap(), None);
    }

    #[test]
    fn cart_remove_product_drops_whole_line() {
        let conn = test_conn();
        cart_add_item(&conn, 1, 10, None, 5).unwrap();
        assert!(cart_remove_product(&conn, 1, 10).unwrap());
        assert!(!cart_remove_product(&conn, 1, 10).unwrap());
    }

    #[test]
    fn carts_are_per_user() {
        let conn = test_conn();
        cart_add_item(&conn, 1, 10, None, 1).unwrap();
        cart_add_item(&conn, 2, 20, None, 2).unwrap();

        let user1 = cart_items(&conn, 1).unwrap();
        assert_eq!(user1.len(), 1);
        assert_eq!(user1[0].product_id, 10);

        cart_clear(&conn, 1).unwrap();
        assert_eq!(cart_line_count(&conn, 1).unwrap(), 0);
        assert_eq!(cart_line_count(&conn, 2).unwrap(), 1);
    }

    #[test]
    fn order_roundtrip() {
        let mut conn = test_conn();
        let items = vec![
            OrderItem {
                product_id: 10,
                name: "Product 10".to_string(),
                quantity: 2,
                unit_price_cents: 1500,
            },
            OrderItem {
                product_id: 11,
                name: "Product 11".to_string(),
                quantity: 1,
                unit_price_cents: 999,
            },
        ];
        let order_id = create_order(&mut conn, 1, "order:1:abc", 3999, "USD", Some("ch_1"), &items).unwrap();

        let orders = recent_orders(&conn, 1, 10).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order_id);
        assert_eq!(orders[0].total_cents, 3999);
        assert_eq!(orders[0].charge_id.as_deref(), Some("ch_1"));

        let stored = order_items(&conn, order_id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "Product 10");

        // Other users see nothing
        assert!(recent_orders(&conn, 2, 10).unwrap().is_empty());
    }
}
