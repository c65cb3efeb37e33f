//! Prompt assembly for the recommendation model.

use crate::catalog::Product;
use crate::core::config;
use crate::core::money::format_price;

/// Renders one specification block per product, joined by a separator line.
///
/// The blocks are the model's only view of the catalog.
// TODO: replace the full-catalog dump with retrieval over product names and
// descriptions once the catalog grows past a prompt-sized set.
pub fn build_product_specs(products: &[Product], currency: &str) -> String {
    let specs: Vec<String> = products
        .iter()
        .map(|p| {
            format!(
                "Product ID: {}\nProduct name: {}\nPrice: {}\nDescription: {}",
                p.id,
                p.name,
                format_price(p.sale_price_cents(), currency),
                p.description.as_deref().unwrap_or("-"),
            )
        })
        .collect();
    specs.join(config::catalog::SPEC_SEPARATOR)
}

/// Builds the user message: catalog specs, the expected JSON shape, and the
/// shopper's request.
pub fn build_prompt(product_specs: &str, user_request: &str) -> String {
    format!(
        r#"These are the available relevant products:
{product_specs}

---
Recommend a list of products to the user. Return a list of products with its product ID and product name in JSON format. Example of JSON output:
{{
    "products": [
        {{
            "id": 2323,
            "name": "product name of 2323"
        }},
        {{
            "id": 973,
            "name": "product name of 973"
        }}
    ]
}}
Recommend products based on the user's request:
{user_request}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, price_cents: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            category_id: 1,
            price_cents,
            description: Some(format!("Description of {name}")),
            discount: None,
            variants: vec![],
            image_urls: vec![],
            stock: None,
            is_digital: false,
        }
    }

    #[test]
    fn specs_include_id_name_and_price() {
        let products = vec![product(7, "Lamp", 1999), product(9, "Kettle", 4500)];
        let specs = build_product_specs(&products, "USD");

        assert!(specs.contains("Product ID: 7"));
        assert!(specs.contains("Product name: Lamp"));
        assert!(specs.contains("Price: $19.99"));
        assert!(specs.contains("Product ID: 9"));
        assert!(specs.contains(config::catalog::SPEC_SEPARATOR.trim()));
    }

    #[test]
    fn prompt_embeds_specs_and_request() {
        let prompt = build_prompt("Product ID: 1", "a gift for a reader");
        assert!(prompt.contains("Product ID: 1"));
        assert!(prompt.ends_with("a gift for a reader"));
        assert!(prompt.contains("\"products\""));
    }
}
