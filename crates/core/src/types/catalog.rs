//! Catalog records: categories and products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::money::discounted_price;
use super::timestamp::Timestamp;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Request body for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

/// A catalog product with its embedded category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i64,
    pub brand: String,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub category: Category,
}

impl Product {
    /// Price after the product's discount.
    #[must_use]
    pub fn sale_price(&self) -> Decimal {
        let discount = Decimal::try_from(self.discount_percentage).unwrap_or(Decimal::ZERO);
        discounted_price(self.price, discount)
    }

    /// Convert back into an update payload (used to prefill edit forms).
    #[must_use]
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            discount_percentage: self.discount_percentage,
            rating: self.rating,
            stock: self.stock,
            brand: self.brand.clone(),
            thumbnail: self.thumbnail.clone(),
            images: self.images.clone(),
            is_published: self.is_published,
            category_id: self.category.id,
        }
    }
}

/// Request body for creating or replacing a product.
///
/// An empty `description` lets the backend generate one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i64,
    pub brand: String,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    pub category_id: CategoryId,
}

const fn default_published() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product_json() -> serde_json::Value {
        json!({
            "id": 3,
            "title": "Phone X",
            "description": null,
            "price": 499.99,
            "discount_percentage": 10.0,
            "rating": 4.5,
            "stock": 12,
            "brand": "Acme",
            "thumbnail": "https://img.example/x.png",
            "images": ["https://img.example/x1.png"],
            "is_published": true,
            "created_at": "2025-01-05T10:00:00",
            "category": {"id": 1, "name": "phones"}
        })
    }

    #[test]
    fn test_product_deserializes_backend_shape() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Decimal::new(49999, 2));
        assert_eq!(product.category.name, "phones");
        assert!(product.description.is_none());
    }

    #[test]
    fn test_sale_price_applies_discount() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(
            product.sale_price().round_dp(2),
            Decimal::new(449_991, 3).round_dp(2)
        );
    }

    #[test]
    fn test_product_input_defaults_to_published() {
        let input: ProductInput = serde_json::from_value(json!({
            "title": "T",
            "price": 1.5,
            "discount_percentage": 0,
            "rating": 0,
            "stock": 1,
            "brand": "B",
            "thumbnail": "t",
            "category_id": 2
        }))
        .unwrap();
        assert!(input.is_published);
        assert!(input.images.is_empty());
    }

    #[test]
    fn test_product_input_sends_price_as_number() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        let body = serde_json::to_value(product.to_input()).unwrap();
        assert!(body["price"].is_number());
        assert_eq!(body["category_id"], 1);
    }
}
