//! Comment operations (`/products/{product_id}/comments`).

use tracing::instrument;

use shopkeeper_core::{Comment, CommentId, CommentInput, ListParams, ListResponse, ProductId};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List a product's comments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list_comments(
        &self,
        product_id: ProductId,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse<Comment>, ApiError> {
        let params = ListParams::new(page, limit);
        self.get(
            &format!("products/{product_id}/comments"),
            &[
                ("page", params.page.to_string()),
                ("limit", params.limit.to_string()),
            ],
        )
        .await
    }

    /// Get a single comment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product or comment does not
    /// exist.
    #[instrument(skip(self), fields(product_id = %product_id, comment_id = %id))]
    pub async fn get_comment(
        &self,
        product_id: ProductId,
        id: CommentId,
    ) -> Result<Comment, ApiError> {
        self.get(&format!("products/{product_id}/comments/{id}"), &[])
            .await
    }

    /// Post a comment. The backend scores its sentiment.
    ///
    /// # Errors
    ///
    /// Returns error if the product does not exist or the API request fails.
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn create_comment(
        &self,
        product_id: ProductId,
        input: &CommentInput,
    ) -> Result<Comment, ApiError> {
        self.post(&format!("products/{product_id}/comments"), input)
            .await
    }

    /// Edit a comment. Only its author may do so.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the signed-in user is not the
    /// author.
    #[instrument(skip(self, input), fields(product_id = %product_id, comment_id = %id))]
    pub async fn update_comment(
        &self,
        product_id: ProductId,
        id: CommentId,
        input: &CommentInput,
    ) -> Result<Comment, ApiError> {
        self.put(&format!("products/{product_id}/comments/{id}"), input)
            .await
    }

    /// Delete a comment.
    ///
    /// # Errors
    ///
    /// Returns error if the comment does not exist or belongs to someone else.
    #[instrument(skip(self), fields(product_id = %product_id, comment_id = %id))]
    pub async fn delete_comment(&self, product_id: ProductId, id: CommentId) -> Result<(), ApiError> {
        self.delete(&format!("products/{product_id}/comments/{id}"))
            .await
    }
}
