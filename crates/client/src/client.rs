//! HTTP client wrapper shared by every resource module.
//!
//! One [`ApiClient`] is built per process from the configured base URL. It is
//! cheap to clone; [`ApiClient::with_session`] derives a client that attaches
//! a particular user's bearer token without rebuilding the connection pool.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use shopkeeper_core::AccessToken;

use crate::error::{ApiError, extract_detail};

/// Client-wide request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authentication state attached to outgoing requests.
///
/// An anonymous session sends no `Authorization` header.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    /// A session without a token.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// A session sending `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
        }
    }

    /// The bearer token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl From<&AccessToken> for Session {
    fn from(token: &AccessToken) -> Self {
        Self::bearer(token.access_token.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Storefront API client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    session: Session,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` cannot be a base
    /// (e.g. `mailto:`), or [`ApiError::Http`] if the HTTP client fails to
    /// build.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        // Relative joins replace the last path segment unless it ends in '/'.
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { http, base_url }),
            session: Session::anonymous(),
        })
    }

    /// Derive a client that authenticates as `session`.
    #[must_use]
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            session,
        }
    }

    /// The session attached to this client.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The normalized base URL (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an API path (with or without leading `/`) plus query pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Execute a GET request and parse the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let response = self.authorize(self.inner.http.get(url)).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a GET request where `204 No Content` means "nothing yet".
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path, &[])?;
        let response = self.authorize(self.inner.http.get(url)).send().await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Self::handle_response(response).await.map(Some)
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let response = self
            .authorize(self.inner.http.post(url).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let response = self
            .authorize(self.inner.http.put(url).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a form-urlencoded body.
    pub(crate) async fn post_form<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        form: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let response = self
            .authorize(self.inner.http.post(url).form(form))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a multipart body.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let response = self
            .authorize(self.inner.http.post(url).multipart(form))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a DELETE request, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path, &[])?;
        let response = self.authorize(self.inner.http.delete(url)).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);

        tracing::debug!(status = status.as_u16(), ?detail, "API request failed");

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
            StatusCode::NOT_FOUND => {
                ApiError::NotFound(detail.unwrap_or_else(|| "Resource not found".to_string()))
            }
            _ => ApiError::Api {
                status: status.as_u16(),
                detail,
            },
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Url::parse(base).unwrap(), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = client("http://api.example.com/v1");
        assert_eq!(client.base_url().as_str(), "http://api.example.com/v1/");
        assert_eq!(
            client.url("/categories/", &[]).unwrap().as_str(),
            "http://api.example.com/v1/categories/"
        );
    }

    #[test]
    fn test_url_encodes_query_pairs() {
        let client = client("http://localhost:8000");
        let url = client
            .url(
                "products/",
                &[("search", "red phone&co".to_string()), ("page", "2".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/products/?search=red+phone%26co&page=2"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let url = Url::parse("mailto:admin@example.com").unwrap();
        assert!(matches!(
            ApiClient::new(&url, DEFAULT_TIMEOUT),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_with_session_shares_pool_and_redacts() {
        let anonymous = client("http://localhost:8000");
        assert!(!anonymous.session().is_authenticated());

        let authed = anonymous.with_session(Session::bearer("tok-super-secret"));
        assert!(authed.session().is_authenticated());
        assert!(Arc::ptr_eq(&anonymous.inner, &authed.inner));

        let debug_output = format!("{authed:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok-super-secret"));
    }
}
