//! E-commerce backend abstraction
//!
//! The bot talks to product catalogs through the [`Ecommerce`] trait so a
//! real storefront (Shopify, WooCommerce, a custom API) can be plugged in
//! without touching the Telegram layer. [`DemoStore`] is the bundled
//! in-memory backend with generated demo data.

pub mod demo;
pub mod types;

use async_trait::async_trait;

use crate::core::AppResult;

pub use demo::DemoStore;
pub use types::{Product, ProductCategory, ProductVariant};

/// Backend contract for product catalogs.
///
/// All lookups are async because real backends are remote APIs; the demo
/// store answers from memory.
#[async_trait]
pub trait Ecommerce: Send + Sync {
    /// Lists products, optionally filtered by a case-insensitive substring
    /// query (over name and description), a category, and a result limit.
    async fn browse_products(
        &self,
        query: Option<&str>,
        category_id: Option<i64>,
        limit: Option<usize>,
    ) -> AppResult<Vec<Product>>;

    /// Looks up a single product. `Ok(None)` when the id is unknown.
    async fn product_by_id(&self, product_id: i64) -> AppResult<Option<Product>>;

    /// Looks up a single category. `Ok(None)` when the id is unknown.
    async fn category_by_id(&self, category_id: i64) -> AppResult<Option<ProductCategory>>;

    /// Lists categories. With `parent_id` set, only direct children of that
    /// category; otherwise only top-level categories.
    async fn categories(&self, parent_id: Option<i64>) -> AppResult<Vec<ProductCategory>>;

    /// ISO 4217 currency code all prices are denominated in.
    fn currency(&self) -> &str;

    /// Convenience: the full unfiltered product list.
    async fn all_products(&self) -> AppResult<Vec<Product>> {
        self.browse_products(None, None, None).await
    }
}
