//! User route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_core::{ListParams, Pager, User, UserId, UserInput, UserListParams};

use crate::{error::AppError, filters, middleware::RequireLogin, state::AppState};

use super::{ConfirmDeleteTemplate, ConfirmForm, NavView, PagerView, render};

/// `?search=&role=&page=` query of the users list.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub page: Option<u32>,
}

impl UsersQuery {
    /// Backend list parameters; an unknown role falls back to `user`.
    #[must_use]
    pub fn params(&self, page_size: u32) -> UserListParams {
        let search = self.search.as_deref().unwrap_or_default().trim();
        UserListParams {
            list: ListParams::new(self.page.unwrap_or(1), page_size).with_search(search),
            role: self
                .role
                .as_deref()
                .and_then(|role| role.parse().ok())
                .unwrap_or_default(),
        }
    }
}

/// User view for templates.
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
    pub cart_count: usize,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i32(),
            username: user.username.clone(),
            fullname: user.fullname.clone(),
            email: user.email.clone().unwrap_or_default(),
            is_active: user.is_active,
            created_at: user.created_at.display_short(),
            cart_count: user.carts.len(),
        }
    }
}

/// Users list page template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub nav: NavView,
    pub users: Vec<UserView>,
    pub search: String,
    pub role: String,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// User create/edit form template.
#[derive(Template)]
#[template(path = "users/form.html")]
pub struct UserFormTemplate {
    pub nav: NavView,
    pub heading: String,
    pub action: String,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
}

/// User form input.
#[derive(Deserialize)]
pub struct UserFormInput {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<UserFormInput> for UserInput {
    fn from(input: UserFormInput) -> Self {
        Self {
            fullname: input.fullname.trim().to_string(),
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            password: input.password,
        }
    }
}

impl UserFormTemplate {
    fn new(login: &RequireLogin, id: Option<UserId>, input: &UserInput) -> Self {
        let (heading, action) = id.map_or_else(
            || ("New user".to_string(), "/users".to_string()),
            |id| (format!("Edit user #{id}"), format!("/users/{id}")),
        );
        Self {
            nav: NavView::new(&login.user, "/users"),
            heading,
            action,
            fullname: input.fullname.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
            error: None,
        }
    }

    fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

fn blank_input() -> UserInput {
    UserInput {
        fullname: String::new(),
        username: String::new(),
        email: String::new(),
        password: String::new(),
    }
}

/// Users list page handler.
#[instrument(skip(login, state))]
pub async fn index(
    login: RequireLogin,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Html<String> {
    let params = query.params(state.page_size());
    let mut pager = Pager::new(params.list.page);

    let (users, error) = match login.api.list_users(&params).await {
        Ok(list) => {
            pager.set_total_pages(list.total_pages);
            (list.data.iter().map(UserView::from).collect(), None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch users: {e}");
            (vec![], Some(e.user_message("Failed to fetch users")))
        }
    };

    let role = params.role.to_string();
    render(&UsersIndexTemplate {
        nav: NavView::new(&login.user, "/users"),
        users,
        pager: PagerView::new(
            &pager,
            "/users",
            &[("search", &params.list.search), ("role", &role)],
        ),
        search: params.list.search.clone(),
        role,
        error,
    })
}

/// New user form handler.
pub async fn new_user(login: RequireLogin) -> Html<String> {
    render(&UserFormTemplate::new(&login, None, &blank_input()))
}

/// Create user handler.
#[instrument(skip(login, input))]
pub async fn create(login: RequireLogin, Form(input): Form<UserFormInput>) -> Response {
    let input = UserInput::from(input);
    match login.api.create_user(&input).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User created");
            Redirect::to("/users").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create user");
            render(
                &UserFormTemplate::new(&login, None, &input)
                    .with_error(e.user_message("Failed to create user")),
            )
            .into_response()
        }
    }
}

/// Edit user form handler. The password is never prefilled.
#[instrument(skip(login))]
pub async fn edit(login: RequireLogin, Path(id): Path<UserId>) -> Result<Html<String>, AppError> {
    let user = login.api.get_user(id).await?;
    let input = UserInput {
        fullname: user.fullname,
        username: user.username,
        email: user.email.unwrap_or_default(),
        password: String::new(),
    };
    Ok(render(&UserFormTemplate::new(&login, Some(id), &input)))
}

/// Update user handler.
#[instrument(skip(login, input))]
pub async fn update(
    login: RequireLogin,
    Path(id): Path<UserId>,
    Form(input): Form<UserFormInput>,
) -> Response {
    let input = UserInput::from(input);
    match login.api.update_user(id, &input).await {
        Ok(_) => {
            tracing::info!(user_id = %id, "User updated");
            Redirect::to("/users").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update user");
            render(
                &UserFormTemplate::new(&login, Some(id), &input)
                    .with_error(e.user_message("Failed to update user")),
            )
            .into_response()
        }
    }
}

fn delete_page(login: &RequireLogin, id: UserId, message: String) -> ConfirmDeleteTemplate {
    ConfirmDeleteTemplate::new(
        NavView::new(&login.user, "/users"),
        "Delete user",
        message,
        format!("/users/{id}/delete"),
        "/users",
    )
}

/// User deletion confirmation page.
#[instrument(skip(login))]
pub async fn confirm_delete(
    login: RequireLogin,
    Path(id): Path<UserId>,
) -> Result<Html<String>, AppError> {
    let user = login.api.get_user(id).await?;
    Ok(render(&delete_page(
        &login,
        id,
        format!("Delete the user {} ({})?", user.username, user.fullname),
    )))
}

/// Delete user handler. Without `confirm=yes` nothing is deleted.
#[instrument(skip(login, form))]
pub async fn delete(
    login: RequireLogin,
    Path(id): Path<UserId>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !form.confirmed() {
        return Redirect::to("/users").into_response();
    }
    match login.api.delete_user(id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "User deleted");
            Redirect::to("/users").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete user");
            let page = delete_page(&login, id, format!("Delete user #{id}?"))
                .with_error(e.user_message("Failed to delete user"));
            render(&page).into_response()
        }
    }
}
