//! Password login (`/login/`).

use serde::Serialize;
use tracing::instrument;

use shopkeeper_core::AccessToken;

use crate::{ApiClient, ApiError};

/// OAuth2 password-grant form. The backend expects the email as `username`.
#[derive(Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange an email and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with status 403 on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        let form = LoginForm {
            username: email,
            password,
        };
        let token: AccessToken = self.post_form("login/", &form).await?;
        tracing::info!("Login succeeded");
        Ok(token)
    }
}
