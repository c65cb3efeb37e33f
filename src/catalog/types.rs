use serde::{Deserialize, Serialize};

/// A selectable product option (size, color, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    /// Option group title, e.g. "Size"
    pub title: String,
    /// Option value, e.g. "XL"
    pub value: String,
    /// Units in stock for this variant
    pub stock: u32,
}

/// A node in the category tree. Top-level categories have no parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl ProductCategory {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A purchasable product.
///
/// Prices are integer minor units (cents), the same representation the
/// Telegram payments API uses for `LabeledPrice` amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub price_cents: i64,
    pub description: Option<String>,
    /// Fractional discount in 0.0..1.0 (0.25 = 25% off)
    pub discount: Option<f64>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// None means "not tracked"
    pub stock: Option<u32>,
    #[serde(default)]
    pub is_digital: bool,
}

impl Product {
    /// Effective unit price after the discount, rounded to the nearest cent.
    pub fn sale_price_cents(&self) -> i64 {
        match self.discount {
            Some(d) if d > 0.0 => crate::core::money::apply_discount(self.price_cents, d),
            _ => self.price_cents,
        }
    }

    /// Discount as a whole percentage for display, when present.
    pub fn discount_percent(&self) -> Option<u32> {
        self.discount
            .filter(|d| *d > 0.0)
            .map(|d| (d * 100.0).round() as u32)
    }
}
