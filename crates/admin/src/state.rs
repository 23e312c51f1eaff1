//! Application state shared across handlers.

use std::sync::Arc;

use shopkeeper_client::{ApiClient, ApiError, SupersedeRegistry};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    searches: SupersedeRegistry,
}

impl AppState {
    /// Build the state, including the shared (anonymous) API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built from the
    /// configured base URL.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url, config.http_timeout)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                searches: SupersedeRegistry::new(),
            }),
        })
    }

    /// Admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Anonymous API client; derive per-user clients with
    /// [`ApiClient::with_session`].
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// In-flight live searches, one per browser session.
    #[must_use]
    pub fn searches(&self) -> &SupersedeRegistry {
        &self.inner.searches
    }

    /// Rows per list page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.config.page_size
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("searches", &self.inner.searches)
            .finish_non_exhaustive()
    }
}
