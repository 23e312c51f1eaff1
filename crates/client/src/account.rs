//! The signed-in account (`/me/`).

use tracing::instrument;

use shopkeeper_core::{Account, AccountUpdate};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the account the session's token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is missing or expired.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Account, ApiError> {
        self.get("me/", &[]).await
    }

    /// Update the signed-in account. The password is always replaced.
    ///
    /// # Errors
    ///
    /// Returns error if the username is taken or the API request fails.
    #[instrument(skip(self, update), fields(username = %update.username))]
    pub async fn update_me(&self, update: &AccountUpdate) -> Result<Account, ApiError> {
        self.put("me/", update).await
    }

    /// Delete the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delete_me(&self) -> Result<(), ApiError> {
        self.delete("me/").await
    }
}
