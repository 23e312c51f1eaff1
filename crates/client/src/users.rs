//! User operations (`/users/`).

use tracing::instrument;

use shopkeeper_core::{ListResponse, User, UserId, UserInput, UserListParams};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List users of `params.role` whose name matches `params.list.search`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self, params: &UserListParams) -> Result<ListResponse<User>, ApiError> {
        self.get("users/", &params.query_pairs()).await
    }

    /// Get a single user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.get(&format!("users/{id}"), &[]).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns error if the email or username is taken or the API request
    /// fails.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: &UserInput) -> Result<User, ApiError> {
        self.post("users/", input).await
    }

    /// Replace a user.
    ///
    /// # Errors
    ///
    /// Returns error if the user does not exist or the API request fails.
    #[instrument(skip(self, input), fields(user_id = %id))]
    pub async fn update_user(&self, id: UserId, input: &UserInput) -> Result<User, ApiError> {
        self.put(&format!("users/{id}"), input).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns error if the user does not exist or the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("users/{id}")).await
    }
}
