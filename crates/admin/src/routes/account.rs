//! The signed-in account (`/me`).

use askama::Template;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_client::ApiError;
use shopkeeper_core::{Account, AccountUpdate, Cart};

use crate::{
    error::{AppError, clear_sentry_user},
    filters,
    middleware::{RequireLogin, clear_current_user},
};

use super::{ConfirmDeleteTemplate, ConfirmForm, NavView, render};

/// Account view for templates.
#[derive(Debug, Clone)]
pub struct AccountView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub carts: Vec<AccountCartView>,
}

/// One of the account's carts.
#[derive(Debug, Clone)]
pub struct AccountCartView {
    pub id: i32,
    pub lines: usize,
    pub total: String,
}

impl From<&Cart> for AccountCartView {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id.as_i32(),
            lines: cart.items.len(),
            total: shopkeeper_core::format_money(cart.total_amount),
        }
    }
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.as_i32(),
            username: account.username.clone(),
            email: account.email.clone(),
            fullname: account.fullname.clone(),
            role: account.role.to_string(),
            is_active: account.is_active,
            created_at: account.created_at.display_short(),
            carts: account.carts.iter().map(AccountCartView::from).collect(),
        }
    }
}

/// Account page template.
#[derive(Template)]
#[template(path = "me.html")]
pub struct AccountTemplate {
    pub nav: NavView,
    pub account: Option<AccountView>,
    pub error: Option<String>,
}

/// Account edit form template.
#[derive(Template)]
#[template(path = "me_edit.html")]
pub struct AccountEditTemplate {
    pub nav: NavView,
    pub username: String,
    pub fullname: String,
    pub error: Option<String>,
}

/// Account form input.
#[derive(Deserialize)]
pub struct AccountFormInput {
    pub username: String,
    pub fullname: String,
    pub password: String,
}

impl From<AccountFormInput> for AccountUpdate {
    fn from(input: AccountFormInput) -> Self {
        Self {
            username: input.username.trim().to_string(),
            fullname: input.fullname.trim().to_string(),
            password: input.password,
        }
    }
}

/// Sign out after the backend rejected the session's token.
async fn expire_session(login: &RequireLogin) -> Result<Response, AppError> {
    tracing::info!(email = %login.user.email, "Token rejected, signing out");
    clear_current_user(&login.session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login").into_response())
}

/// Account page handler.
///
/// A 401 from the backend clears the session and redirects to `/login`.
#[instrument(skip_all)]
pub async fn show(login: RequireLogin) -> Result<Response, AppError> {
    let (account, error) = match login.api.me().await {
        Ok(account) => (Some(AccountView::from(&account)), None),
        Err(ApiError::Unauthorized(_)) => return expire_session(&login).await,
        Err(e) => {
            tracing::error!("Failed to fetch account: {e}");
            (None, Some(e.user_message("Failed to load account")))
        }
    };

    Ok(render(&AccountTemplate {
        nav: NavView::new(&login.user, "/me"),
        account,
        error,
    })
    .into_response())
}

/// Account edit form handler.
#[instrument(skip_all)]
pub async fn edit(login: RequireLogin) -> Result<Response, AppError> {
    match login.api.me().await {
        Ok(account) => Ok(render(&AccountEditTemplate {
            nav: NavView::new(&login.user, "/me"),
            username: account.username,
            fullname: account.fullname,
            error: None,
        })
        .into_response()),
        Err(ApiError::Unauthorized(_)) => expire_session(&login).await,
        Err(e) => Err(e.into()),
    }
}

/// Update account handler.
#[instrument(skip_all)]
pub async fn update(
    login: RequireLogin,
    Form(input): Form<AccountFormInput>,
) -> Result<Response, AppError> {
    let update = AccountUpdate::from(input);
    match login.api.update_me(&update).await {
        Ok(_) => {
            tracing::info!(username = %update.username, "Account updated");
            Ok(Redirect::to("/me").into_response())
        }
        Err(ApiError::Unauthorized(_)) => expire_session(&login).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to update account");
            Ok(render(&AccountEditTemplate {
                nav: NavView::new(&login.user, "/me"),
                username: update.username,
                fullname: update.fullname,
                error: Some(e.user_message("Failed to update account")),
            })
            .into_response())
        }
    }
}

/// Account deletion confirmation page.
#[instrument(skip_all)]
pub async fn confirm_delete(login: RequireLogin) -> impl IntoResponse {
    render(&delete_page(&login))
}

fn delete_page(login: &RequireLogin) -> ConfirmDeleteTemplate {
    ConfirmDeleteTemplate::new(
        NavView::new(&login.user, "/me"),
        "Delete account",
        format!(
            "Delete the account {}? This cannot be undone.",
            login.user.email
        ),
        "/me/delete".to_string(),
        "/me",
    )
}

/// Delete account handler. Without `confirm=yes` nothing is deleted.
#[instrument(skip_all)]
pub async fn delete(
    login: RequireLogin,
    Form(form): Form<ConfirmForm>,
) -> Result<Response, AppError> {
    if !form.confirmed() {
        return Ok(Redirect::to("/me").into_response());
    }

    match login.api.delete_me().await {
        Ok(()) => {}
        Err(ApiError::Unauthorized(_)) => return expire_session(&login).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete account");
            let page = delete_page(&login).with_error(e.user_message("Failed to delete account"));
            return Ok(render(&page).into_response());
        }
    }
    tracing::info!(email = %login.user.email, "Account deleted");
    clear_current_user(&login.session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login").into_response())
}
