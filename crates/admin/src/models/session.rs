//! Session-stored authentication state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopkeeper_client::Session as ApiSession;

/// The signed-in user as kept in the browser's server-side session.
///
/// Holds the backend bearer token; the token never reaches the browser.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Email used to sign in.
    pub email: String,
    /// Backend bearer token.
    pub access_token: String,
    /// Key grouping this session's live searches so a newer one can abort
    /// the older.
    pub search_key: Uuid,
}

impl CurrentUser {
    /// New session state after a successful login.
    #[must_use]
    pub fn new(email: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            access_token: access_token.into(),
            search_key: Uuid::new_v4(),
        }
    }

    /// Client-side session carrying this user's token.
    #[must_use]
    pub fn api_session(&self) -> ApiSession {
        ApiSession::bearer(self.access_token.clone())
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("search_key", &self.search_key)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let user = CurrentUser::new("ann@example.com", "eyJ-very-secret");
        let debug_output = format!("{user:?}");
        assert!(debug_output.contains("ann@example.com"));
        assert!(!debug_output.contains("eyJ-very-secret"));
        assert!(user.api_session().is_authenticated());
    }

    #[test]
    fn test_each_login_gets_its_own_search_key() {
        let a = CurrentUser::new("a@example.com", "t1");
        let b = CurrentUser::new("a@example.com", "t1");
        assert_ne!(a.search_key, b.search_key);
    }
}
