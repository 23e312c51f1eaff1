//! Category operations (`/categories/`).

use tracing::instrument;

use shopkeeper_core::{Category, CategoryId, CategoryInput, ListParams, ListResponse};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List categories matching `params.search`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<Category>, ApiError> {
        self.get("categories/", &params.query_pairs()).await
    }

    /// Get a single category by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the category does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.get(&format!("categories/{id}"), &[]).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns error if the name is taken or the API request fails.
    #[instrument(skip(self))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        self.post("categories/", input).await
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns error if the category does not exist or the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        self.put(&format!("categories/{id}"), input).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns error if the category does not exist or the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.delete(&format!("categories/{id}")).await
    }
}
