//! Authentication extractor for admin pages.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use shopkeeper_client::ApiClient;

use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Yields the user, their session, and an API client carrying their token.
/// Without a token in the session, page requests are redirected to `/login`
/// and htmx fragment requests get an `HX-Redirect` header.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireLogin { api, .. }: RequireLogin) -> impl IntoResponse {
///     api.me().await.map(|me| me.username).unwrap_or_default()
/// }
/// ```
pub struct RequireLogin {
    pub user: CurrentUser,
    pub session: Session,
    pub api: ApiClient,
}

/// Error returned when a page requires a signed-in user.
#[derive(Debug)]
pub enum LoginRejection {
    /// Redirect to login page (for full page requests).
    RedirectToLogin,
    /// Tell htmx to navigate to the login page.
    HxRedirect,
    /// No session layer is installed.
    MissingSession,
}

impl IntoResponse for LoginRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::HxRedirect => (StatusCode::OK, [("HX-Redirect", "/login")]).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireLogin {
    type Rejection = LoginRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(LoginRejection::MissingSession)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.headers.contains_key("HX-Request") {
                    LoginRejection::HxRedirect
                } else {
                    LoginRejection::RedirectToLogin
                }
            })?;

        let api = state.api().with_session(user.api_session());
        Ok(Self { user, session, api })
    }
}

/// Store the signed-in user in the session.
///
/// Cycles the session ID first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the signed-in user from the session (logout, expired token).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
