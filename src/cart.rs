//! Shopping cart model
//!
//! Cart lines are persisted in SQLite (`storage::db`); this module joins the
//! stored lines with catalog products and owns all the money math and the
//! textual cart summary.

use unic_langid::LanguageIdentifier;

use crate::catalog::{Ecommerce, Product};
use crate::core::money::{apply_discount, format_price};
use crate::core::AppResult;
use crate::i18n;
use crate::storage::db::{self, DbPool, OrderItem};

/// One cart line joined with its catalog product.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    pub variant_id: Option<i64>,
}

impl CartLine {
    /// Line total in cents: quantity times price, discounted, rounded once.
    pub fn total_cents(&self) -> i64 {
        let gross = self.quantity * self.product.price_cents;
        match self.product.discount {
            Some(d) if d > 0.0 => apply_discount(gross, d),
            _ => gross,
        }
    }
}

/// A user's cart at a point in time.
#[derive(Debug, Clone)]
pub struct Cart {
    pub user_id: i64,
    pub currency: String,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Loads the user's cart from the database and resolves each line against
    /// the catalog. Lines whose product vanished from the catalog are dropped
    /// (and logged) instead of failing the whole cart.
    ///
    /// Connections are scoped to the synchronous row fetches; a pooled
    /// connection must not be alive across the catalog awaits because the
    /// handler futures have to stay `Send`.
    pub async fn load(pool: &DbPool, user_id: i64, store: &dyn Ecommerce) -> AppResult<Self> {
        let rows = {
            let conn = db::get_connection(pool)?;
            db::cart_items(&conn, user_id)?
        };

        let mut lines = Vec::with_capacity(rows.len());
        let mut stale = Vec::new();
        for row in rows {
            match store.product_by_id(row.product_id).await? {
                Some(product) => lines.push(CartLine {
                    product,
                    quantity: row.quantity,
                    variant_id: row.variant_id,
                }),
                None => {
                    log::warn!(
                        "Dropping cart line for user {}: product {} no longer in catalog",
                        user_id,
                        row.product_id
                    );
                    stale.push(row.product_id);
                }
            }
        }

        if !stale.is_empty() {
            let conn = db::get_connection(pool)?;
            for product_id in stale {
                if let Err(e) = db::cart_remove_product(&conn, user_id, product_id) {
                    log::error!(
                        "Failed to purge stale cart line {} for user {}: {}",
                        product_id,
                        user_id,
                        e
                    );
                }
            }
        }

        Ok(Self {
            user_id,
            currency: store.currency().to_string(),
            lines,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct cart lines, shown in the "Cart (N)" badge.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Cart total in cents, discounts applied per line.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::total_cents).sum()
    }

    /// Renders the localized cart summary:
    ///
    /// ```text
    /// Your cart:
    /// - Product 3 x2 = $19.98 (25% off)
    /// - Product 7 x1 = $5.00
    ///
    /// Total: $24.98
    /// ```
    pub fn summary(&self, lang: &LanguageIdentifier, header_key: &str) -> String {
        if self.is_empty() {
            return i18n::t(lang, "cart-empty");
        }

        let mut out = i18n::t(lang, header_key);
        out.push('\n');

        for line in &self.lines {
            let total = format_price(line.total_cents(), &self.currency);
            match line.product.discount_percent() {
                Some(percent) => {
                    out.push_str(&format!(
                        "- {} x{} = {} ({}% off)\n",
                        line.product.name, line.quantity, total, percent
                    ));
                }
                None => {
                    out.push_str(&format!(
                        "- {} x{} = {}\n",
                        line.product.name, line.quantity, total
                    ));
                }
            }
        }

        out.push('\n');
        out.push_str(&i18n::t(lang, "cart-total"));
        out.push_str(": ");
        out.push_str(&format_price(self.total_cents(), &self.currency));
        out
    }

    /// Converts the cart into denormalized order lines for the order history.
    pub fn to_order_items(&self) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|line| OrderItem {
                product_id: line.product.id,
                name: line.product.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.product.sale_price_cents(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product(id: i64, price_cents: i64, discount: Option<f64>) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            category_id: 0,
            price_cents,
            description: None,
            discount,
            variants: vec![],
            image_urls: vec![],
            stock: None,
            is_digital: false,
        }
    }

    fn cart(lines: Vec<CartLine>) -> Cart {
        Cart {
            user_id: 1,
            currency: "USD".to_string(),
            lines,
        }
    }

    #[test]
    fn total_sums_all_lines_with_discounts() {
        let cart = cart(vec![
            CartLine {
                product: product(1, 1000, None),
                quantity: 2,
                variant_id: None,
            },
            CartLine {
                product: product(2, 1000, Some(0.25)),
                quantity: 1,
                variant_id: None,
            },
        ]);

        // 2 * 10.00 + 1 * 7.50
        assert_eq!(cart.total_cents(), 2750);
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn line_total_discounts_the_whole_line_before_rounding() {
        // 10 x 999 at 10% off is 8991.0; rounding per unit first would lose
        // a cent (10 x 899 = 8990)
        let cart = cart(vec![CartLine {
            product: product(1, 999, Some(0.10)),
            quantity: 10,
            variant_id: None,
        }]);
        assert_eq!(cart.total_cents(), 8991);
    }

    #[test]
    fn summary_lists_lines_and_grand_total() {
        let lang = i18n::lang_from_code("en");
        let cart = cart(vec![
            CartLine {
                product: product(1, 1000, None),
                quantity: 2,
                variant_id: None,
            },
            CartLine {
                product: product(2, 1000, Some(0.25)),
                quantity: 1,
                variant_id: None,
            },
        ]);

        let summary = cart.summary(&lang, "cart-header");
        assert!(summary.contains("- Product 1 x2 = $20.00"));
        assert!(summary.contains("- Product 2 x1 = $7.50 (25% off)"));
        // The grand total is the sum of the lines, not the last line's total
        assert!(summary.contains(": $27.50"));
    }

    #[test]
    fn summary_of_empty_cart() {
        let lang = i18n::lang_from_code("en");
        let cart = cart(vec![]);
        let summary = cart.summary(&lang, "cart-header");
        assert_eq!(summary, i18n::t(&lang, "cart-empty"));
    }

    #[test]
    fn order_items_capture_sale_price() {
        let cart = cart(vec![CartLine {
            product: product(2, 1000, Some(0.25)),
            quantity: 3,
            variant_id: None,
        }]);

        let items = cart.to_order_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price_cents, 750);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].name, "Product 2");
    }
}
