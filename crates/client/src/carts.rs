//! Cart operations (`/carts/`).

use tracing::instrument;

use shopkeeper_core::{Cart, CartId, CartInput, ListParams, ListResponse};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List carts. Carts have no search filter.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_carts(&self, page: u32, limit: u32) -> Result<ListResponse<Cart>, ApiError> {
        let params = ListParams::new(page, limit);
        self.get(
            "carts/",
            &[
                ("page", params.page.to_string()),
                ("limit", params.limit.to_string()),
            ],
        )
        .await
    }

    /// Get a single cart by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the cart does not exist.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn get_cart(&self, id: CartId) -> Result<Cart, ApiError> {
        self.get(&format!("carts/{id}"), &[]).await
    }

    /// Create a cart for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns error if a product does not exist or the API request fails.
    #[instrument(skip(self, input), fields(lines = input.cart_items.len()))]
    pub async fn create_cart(&self, input: &CartInput) -> Result<Cart, ApiError> {
        self.post("carts/", input).await
    }

    /// Replace a cart's lines.
    ///
    /// # Errors
    ///
    /// Returns error if the cart or a product does not exist or the API
    /// request fails.
    #[instrument(skip(self, input), fields(cart_id = %id))]
    pub async fn update_cart(&self, id: CartId, input: &CartInput) -> Result<Cart, ApiError> {
        self.put(&format!("carts/{id}"), input).await
    }

    /// Delete a cart.
    ///
    /// # Errors
    ///
    /// Returns error if the cart does not exist or the API request fails.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn delete_cart(&self, id: CartId) -> Result<(), ApiError> {
        self.delete(&format!("carts/{id}")).await
    }
}
