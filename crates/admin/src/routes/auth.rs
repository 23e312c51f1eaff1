//! Login and logout.

use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::{AppError, clear_sentry_user, set_sentry_user},
    filters,
    middleware::{clear_current_user, set_current_user},
    models::CurrentUser,
    state::AppState,
};

use super::render;

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Login form input.
#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Render the login page.
///
/// GET /login
pub async fn login_page() -> Html<String> {
    render(&LoginTemplate {
        email: String::new(),
        error: None,
    })
}

/// Exchange credentials for a token and keep it in the session.
///
/// POST /login
#[instrument(skip_all, fields(email = %input.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<LoginInput>,
) -> Result<Response, AppError> {
    match state.api().login(input.email.trim(), &input.password).await {
        Ok(token) => {
            let user = CurrentUser::new(input.email.trim(), token.access_token);
            set_current_user(&session, &user).await?;
            set_sentry_user(&user.email);
            tracing::info!("User signed in");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(render(&LoginTemplate {
                email: input.email,
                error: Some(e.user_message("Failed to log in")),
            })
            .into_response())
        }
    }
}

/// Forget the token.
///
/// POST /logout
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}
