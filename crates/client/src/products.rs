//! Product operations (`/products/`), including the backend's comment analysis.

use tracing::instrument;

use shopkeeper_core::{AiAnalysis, ListParams, ListResponse, Product, ProductId, ProductInput};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List products whose title contains `params.search`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Product>, ApiError> {
        self.get("products/", &params.query_pairs()).await
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&format!("products/{id}"), &[]).await
    }

    /// Create a product. The backend writes a description when none is given.
    ///
    /// # Errors
    ///
    /// Returns error if the category does not exist or the API request fails.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        self.post("products/", input).await
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product or category does not exist or the API
    /// request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.put(&format!("products/{id}"), input).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product does not exist or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("products/{id}")).await
    }

    /// Sentiment and summary of a product's comments.
    ///
    /// Returns `Ok(None)` when the product has no comments yet.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn ai_analysis(&self, id: ProductId) -> Result<Option<AiAnalysis>, ApiError> {
        self.get_optional(&format!("products/{id}/ai_analysis")).await
    }
}
