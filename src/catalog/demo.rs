//! In-memory demo catalog with generated data
//!
//! Mirrors what a real backend would answer, so every bot flow can be
//! exercised without credentials for an actual storefront. Data generation
//! is seeded, which keeps tests and repeated runs deterministic.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{Product, ProductCategory, ProductVariant};
use super::Ecommerce;
use crate::core::AppResult;

const DEMO_SEED: u64 = 0x1a_5ca7a1_06;

/// Demo e-commerce backend. All data lives in memory and is immutable after
/// construction.
pub struct DemoStore {
    categories: Vec<ProductCategory>,
    products: Vec<Product>,
    currency: String,
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoStore {
    /// Builds the demo catalog: a fixed two-level category tree with one to
    /// five generated products per category.
    pub fn new() -> Self {
        let categories = demo_categories();
        let mut rng = StdRng::seed_from_u64(DEMO_SEED);
        let mut products = Vec::new();

        for category in &categories {
            let count = rng.gen_range(1..=5);
            for _ in 0..count {
                let id = products.len() as i64;
                products.push(generate_product(id, category.id, &mut rng));
            }
        }

        Self {
            categories,
            products,
            currency: "USD".to_string(),
        }
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn demo_categories() -> Vec<ProductCategory> {
    let spec: &[(i64, &str, Option<i64>)] = &[
        (0, "Electronics", None),
        (1, "Clothing", None),
        (2, "Books", None),
        (3, "Home & Kitchen", None),
        (4, "Laptops", Some(0)),
        (5, "Smartphones", Some(0)),
        (6, "T-shirts", Some(1)),
        (7, "Jeans", Some(1)),
        (8, "Caps", Some(1)),
        (9, "Fiction", Some(2)),
        (10, "Non-fiction", Some(2)),
    ];

    spec.iter()
        .map(|(id, name, parent_id)| ProductCategory {
            id: *id,
            name: (*name).to_string(),
            parent_id: *parent_id,
        })
        .collect()
}

fn generate_product(id: i64, category_id: i64, rng: &mut StdRng) -> Product {
    // Prices between $1.00 and $1000.00
    let price_cents = rng.gen_range(100..=100_000);

    // Roughly a quarter of the catalog is on sale
    let discount = if id % 4 == 3 {
        Some(if id % 8 == 3 { 0.10 } else { 0.25 })
    } else {
        None
    };

    // Every fifth product has size variants
    let variants = if id % 5 == 4 {
        ["S", "M", "L"]
            .iter()
            .enumerate()
            .map(|(i, value)| ProductVariant {
                id: id * 10 + i as i64,
                title: "Size".to_string(),
                value: (*value).to_string(),
                stock: rng.gen_range(0..50),
            })
            .collect()
    } else {
        Vec::new()
    };

    Product {
        id,
        name: format!("Product {id}"),
        category_id,
        price_cents,
        description: Some(format!("This is product {id}.")),
        discount,
        variants,
        image_urls: vec![
            "https://placehold.co/150".to_string(),
            "https://placehold.co/200".to_string(),
            "https://placehold.co/250".to_string(),
        ],
        stock: Some(rng.gen_range(1..100)),
        is_digital: false,
    }
}

#[async_trait]
impl Ecommerce for DemoStore {
    async fn browse_products(
        &self,
        query: Option<&str>,
        category_id: Option<i64>,
        limit: Option<usize>,
    ) -> AppResult<Vec<Product>> {
        let mut found: Vec<Product> = self
            .products
            .iter()
            .filter(|p| category_id.is_none_or(|c| p.category_id == c))
            .cloned()
            .collect();

        if let Some(q) = query {
            let q = q.to_lowercase();
            found.retain(|p| {
                p.name.to_lowercase().contains(&q)
                    || p.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&q))
            });
        }

        if let Some(limit) = limit {
            found.truncate(limit);
        }

        Ok(found)
    }

    async fn product_by_id(&self, product_id: i64) -> AppResult<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn category_by_id(&self, category_id: i64) -> AppResult<Option<ProductCategory>> {
        Ok(self.categories.iter().find(|c| c.id == category_id).cloned())
    }

    async fn categories(&self, parent_id: Option<i64>) -> AppResult<Vec<ProductCategory>> {
        Ok(self
            .categories
            .iter()
            .filter(|c| match parent_id {
                Some(parent) => c.parent_id == Some(parent),
                None => c.is_top_level(),
            })
            .cloned()
            .collect())
    }

    fn currency(&self) -> &str {
        &self.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_products_for_every_category() {
        let store = DemoStore::new();
        assert!(!store.is_empty());

        for category_id in 0..=10 {
            let products = store
                .browse_products(None, Some(category_id), None)
                .await
                .unwrap();
            assert!(
                (1..=5).contains(&products.len()),
                "category {category_id} has {} products",
                products.len()
            );
            assert!(products.iter().all(|p| p.category_id == category_id));
        }
    }

    #[tokio::test]
    async fn generation_is_deterministic() {
        let a = DemoStore::new();
        let b = DemoStore::new();
        assert_eq!(a.len(), b.len());

        let pa = a.product_by_id(0).await.unwrap().unwrap();
        let pb = b.product_by_id(0).await.unwrap().unwrap();
        assert_eq!(pa.price_cents, pb.price_cents);
    }

    #[tokio::test]
    async fn search_matches_name_and_description() {
        let store = DemoStore::new();

        let by_name = store.browse_products(Some("product 1"), None, None).await.unwrap();
        assert!(by_name.iter().any(|p| p.id == 1));

        // Description is "This is product N.", so a description-only phrase
        // finds everything
        let by_desc = store.browse_products(Some("this is"), None, None).await.unwrap();
        assert_eq!(by_desc.len(), store.len());

        let none = store.browse_products(Some("zzz-no-such"), None, None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn search_respects_limit_and_category() {
        let store = DemoStore::new();
        let limited = store.browse_products(Some("product"), None, Some(3)).await.unwrap();
        assert!(limited.len() <= 3);

        let in_category = store
            .browse_products(Some("product"), Some(0), None)
            .await
            .unwrap();
        assert!(in_category.iter().all(|p| p.category_id == 0));
    }

    #[tokio::test]
    async fn top_level_and_child_categories() {
        let store = DemoStore::new();

        let top = store.categories(None).await.unwrap();
        assert_eq!(top.len(), 4);
        assert!(top.iter().all(ProductCategory::is_top_level));

        let electronics = store.categories(Some(0)).await.unwrap();
        let names: Vec<&str> = electronics.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Laptops", "Smartphones"]);

        // Leaf categories have no children
        assert!(store.categories(Some(4)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_none() {
        let store = DemoStore::new();
        assert!(store.product_by_id(99_999).await.unwrap().is_none());
        assert!(store.category_by_id(99).await.unwrap().is_none());
    }
}
