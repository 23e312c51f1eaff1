//! Shopping carts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartId, CartItemId, ProductId, UserId};
use super::timestamp::Timestamp;

/// A line in a cart. `subtotal` already includes the product discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// A cart owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: Timestamp,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(rename = "cart_items", default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A requested line when creating or replacing a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Request body for creating or replacing a cart.
///
/// The backend prices every line itself; replacing a cart drops its old lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartInput {
    pub cart_items: Vec<CartItemInput>,
}

impl CartInput {
    /// Build a cart request from `(product, quantity)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ProductId, i64)>) -> Self {
        Self {
            cart_items: pairs
                .into_iter()
                .map(|(product_id, quantity)| CartItemInput {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_reads_cart_items_field() {
        let cart: Cart = serde_json::from_value(json!({
            "id": 1,
            "user_id": 4,
            "created_at": "2025-02-02T09:00:00Z",
            "total_amount": 30.5,
            "cart_items": [
                {"id": 10, "product_id": 2, "quantity": 2, "subtotal": 20.0,
                 "product": {"id": 2, "title": "ignored"}},
                {"id": 11, "product_id": 3, "quantity": 1, "subtotal": 10.5}
            ]
        }))
        .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.unit_count(), 3);
        assert_eq!(cart.total_amount, Decimal::new(305, 1));
    }

    #[test]
    fn test_cart_input_from_pairs() {
        let input = CartInput::from_pairs([(ProductId::new(1), 2), (ProductId::new(5), 1)]);
        let body = serde_json::to_value(&input).unwrap();
        assert_eq!(
            body,
            json!({"cart_items": [
                {"product_id": 1, "quantity": 2},
                {"product_id": 5, "quantity": 1}
            ]})
        );
    }
}
