//! End-to-end cart and order flow against a real SQLite file and the demo
//! catalog.

use lavka::cart::Cart;
use lavka::catalog::{DemoStore, Ecommerce};
use lavka::storage::db;
use lavka::storage::{create_pool, get_connection};

const USER: i64 = 777;

#[tokio::test]
async fn cart_checkout_order_flow() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.sqlite");
    let pool = create_pool(db_path.to_str().unwrap()).unwrap();
    let store = DemoStore::new();

    let conn = get_connection(&pool).unwrap();
    db::ensure_user(&conn, USER, Some("buyer"), "en").unwrap();

    // Fill the cart from the catalog
    let first = store.product_by_id(0).await.unwrap().unwrap();
    let second = store.product_by_id(1).await.unwrap().unwrap();
    db::cart_add_item(&conn, USER, first.id, None, 2).unwrap();
    db::cart_add_item(&conn, USER, second.id, None, 1).unwrap();

    let cart = Cart::load(&pool, USER, &store).await.unwrap();
    assert_eq!(cart.line_count(), 2);
    assert_eq!(
        cart.total_cents(),
        2 * first.sale_price_cents() + second.sale_price_cents()
    );

    let summary = cart.summary(&lavka::i18n::lang_from_code("en"), "cart-header");
    assert!(summary.contains(&first.name));
    assert!(summary.contains("Total"));

    // Payment succeeded: record the order and clear the cart
    let mut conn = get_connection(&pool).unwrap();
    let order_id = db::create_order(
        &mut conn,
        USER,
        "order:777:00000000-0000-0000-0000-000000000000",
        cart.total_cents(),
        "USD",
        Some("ch_test"),
        &cart.to_order_items(),
    )
    .unwrap();
    db::cart_clear(&conn, USER).unwrap();

    let reloaded = Cart::load(&pool, USER, &store).await.unwrap();
    assert!(reloaded.is_empty());

    let orders = db::recent_orders(&conn, USER, 10).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order_id);
    assert_eq!(orders[0].total_cents, cart.total_cents());

    let items = db::order_items(&conn, order_id).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|i| i.product_id == first.id && i.quantity == 2));
}

// The dispatcher requires handler futures to be Send, so loading a cart must
// not hold a pooled connection across the catalog awaits.
#[tokio::test]
async fn cart_load_future_is_send() {
    fn assert_send<T: Send>(value: T) -> T {
        value
    }

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.sqlite");
    let pool = create_pool(db_path.to_str().unwrap()).unwrap();
    let store = DemoStore::new();

    let cart = assert_send(Cart::load(&pool, USER, &store)).await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn cart_drops_lines_for_vanished_products() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.sqlite");
    let pool = create_pool(db_path.to_str().unwrap()).unwrap();
    let store = DemoStore::new();

    let conn = get_connection(&pool).unwrap();
    db::ensure_user(&conn, USER, None, "en").unwrap();
    db::cart_add_item(&conn, USER, 0, None, 1).unwrap();
    // A product id the catalog does not know
    db::cart_add_item(&conn, USER, 1_000_000, None, 3).unwrap();

    let cart = Cart::load(&pool, USER, &store).await.unwrap();
    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.lines[0].product.id, 0);

    // The stale line is gone from storage too
    assert!(!db::cart_has_product(&conn, USER, 1_000_000).unwrap());
}
