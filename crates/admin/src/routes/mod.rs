//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Index of all pages
//!
//! # Auth
//! GET  /login                              - Login page
//! POST /login                              - Exchange credentials for a token
//! POST /logout                             - Forget the token
//!
//! # Account
//! GET  /me                                 - Signed-in account
//! GET  /me/edit, POST /me                  - Edit account
//! GET  /me/delete, POST /me/delete         - Delete account (confirmed)
//!
//! # Catalog
//! GET  /categories, /products, /users, /carts             - Lists (search, page)
//! GET  /<resource>/new, POST /<resource>                  - Create
//! GET  /<resource>/{id}/edit, POST /<resource>/{id}       - Edit
//! GET  /<resource>/{id}/delete, POST /<resource>/{id}/delete - Delete (confirmed)
//! GET  /products/live                      - Debounced search fragment (htmx)
//!
//! # Comments
//! GET  /comments/{product_id}              - A product's comments
//! GET  /comments/{product_id}/new, POST /comments/{product_id}
//! GET  /comments/{product_id}/{id}/edit, POST /comments/{product_id}/{id}
//! GET  /comments/{product_id}/{id}/delete, POST /comments/{product_id}/{id}/delete
//!
//! # Search
//! GET  /text_search                        - Semantic text search
//! GET  /voice_search, POST /voice_search   - Voice search (upload or recording)
//! GET  /{product_id}/ai_analysis           - Comment sentiment and summary
//! ```

use askama::Template;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;

use shopkeeper_core::{ListParams, Pager};

use crate::{filters, models::CurrentUser, state::AppState};

pub mod account;
pub mod auth;
pub mod carts;
pub mod categories;
pub mod comments;
pub mod dashboard;
pub mod products;
pub mod search;
pub mod users;

/// Largest voice clip accepted by `/voice_search`.
const VOICE_UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // Account
        .route("/me", get(account::show).post(account::update))
        .route("/me/edit", get(account::edit))
        .route(
            "/me/delete",
            get(account::confirm_delete).post(account::delete),
        )
        // Categories
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/new", get(categories::new_category))
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/edit", get(categories::edit))
        .route(
            "/categories/{id}/delete",
            get(categories::confirm_delete).post(categories::delete),
        )
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_product))
        .route("/products/live", get(products::live))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route(
            "/products/{id}/delete",
            get(products::confirm_delete).post(products::delete),
        )
        .route("/{product_id}/ai_analysis", get(products::ai_analysis))
        // Users
        .route("/users", get(users::index).post(users::create))
        .route("/users/new", get(users::new_user))
        .route("/users/{id}", post(users::update))
        .route("/users/{id}/edit", get(users::edit))
        .route(
            "/users/{id}/delete",
            get(users::confirm_delete).post(users::delete),
        )
        // Carts
        .route("/carts", get(carts::index).post(carts::create))
        .route("/carts/new", get(carts::new_cart))
        .route("/carts/{id}", post(carts::update))
        .route("/carts/{id}/edit", get(carts::edit))
        .route(
            "/carts/{id}/delete",
            get(carts::confirm_delete).post(carts::delete),
        )
        // Comments
        .route(
            "/comments/{product_id}",
            get(comments::index).post(comments::create),
        )
        .route("/comments/{product_id}/new", get(comments::new_comment))
        .route("/comments/{product_id}/{id}", post(comments::update))
        .route("/comments/{product_id}/{id}/edit", get(comments::edit))
        .route(
            "/comments/{product_id}/{id}/delete",
            get(comments::confirm_delete).post(comments::delete),
        )
        // Search
        .route("/text_search", get(search::text_search))
        .route(
            "/voice_search",
            get(search::voice_page)
                .post(search::voice_search)
                .layer(DefaultBodyLimit::max(VOICE_UPLOAD_LIMIT)),
        )
}

// =============================================================================
// Shared views
// =============================================================================

/// Navigation context shared by every page.
#[derive(Debug, Clone)]
pub struct NavView {
    pub email: String,
    pub current_path: String,
}

impl NavView {
    /// Navigation for `user` on the page at `current_path`.
    #[must_use]
    pub fn new(user: &CurrentUser, current_path: &str) -> Self {
        Self {
            email: user.email.clone(),
            current_path: current_path.to_string(),
        }
    }
}

/// Prev/Next links for a paginated list.
#[derive(Debug, Clone)]
pub struct PagerView {
    pub label: String,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl PagerView {
    /// Links to the neighbouring pages of `path`, keeping the non-empty
    /// `params` (search, role, ...).
    #[must_use]
    pub fn new(pager: &Pager, path: &str, params: &[(&str, &str)]) -> Self {
        Self {
            label: pager.label(),
            prev_url: pager.prev_page().map(|page| page_url(path, params, page)),
            next_url: pager.next_page().map(|page| page_url(path, params, page)),
        }
    }
}

fn page_url(path: &str, params: &[(&str, &str)], page: u32) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if !value.is_empty() {
            query.append_pair(key, value);
        }
    }
    query.append_pair("page", &page.to_string());
    format!("{path}?{}", query.finish())
}

/// `?search=&page=` query of the list pages.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl ListQuery {
    /// Trimmed search text (empty when absent).
    #[must_use]
    pub fn search(&self) -> String {
        self.search.as_deref().unwrap_or_default().trim().to_string()
    }

    /// Backend list parameters for this query.
    #[must_use]
    pub fn params(&self, page_size: u32) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), page_size).with_search(self.search())
    }
}

/// Delete confirmation page shared by every resource.
#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub nav: NavView,
    pub title: String,
    pub message: String,
    pub action: String,
    pub cancel_url: String,
    /// Why the last delete attempt failed.
    pub error: Option<String>,
}

impl ConfirmDeleteTemplate {
    /// Confirmation page whose form posts to `action`.
    #[must_use]
    pub fn new(nav: NavView, title: &str, message: String, action: String, cancel_url: &str) -> Self {
        Self {
            nav,
            title: title.to_string(),
            message,
            action,
            cancel_url: cancel_url.to_string(),
            error: None,
        }
    }

    /// Same page, showing why the delete failed.
    #[must_use]
    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

/// Answer posted from [`ConfirmDeleteTemplate`].
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: String,
}

impl ConfirmForm {
    /// Only an explicit "yes" confirms; anything else cancels.
    #[must_use]
    pub fn confirmed(&self) -> bool {
        self.confirm == "yes"
    }
}

/// Render a template, logging (and hiding) render failures.
pub fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_links_keep_filters() {
        let mut pager = Pager::new(2);
        pager.set_total_pages(None);
        let view = PagerView::new(&pager, "/users", &[("search", "ann lee"), ("role", "admin")]);
        assert_eq!(view.prev_url.as_deref(), Some("/users?search=ann+lee&role=admin&page=1"));
        assert_eq!(view.next_url.as_deref(), Some("/users?search=ann+lee&role=admin&page=3"));
        assert_eq!(view.label, "Page 2");
    }

    #[test]
    fn test_pager_first_page_has_no_prev() {
        let view = PagerView::new(&Pager::new(1), "/carts", &[("search", "")]);
        assert!(view.prev_url.is_none());
        assert_eq!(view.next_url.as_deref(), Some("/carts?page=2"));
    }

    #[test]
    fn test_confirm_form_requires_yes() {
        assert!(ConfirmForm { confirm: "yes".to_string() }.confirmed());
        assert!(!ConfirmForm { confirm: "no".to_string() }.confirmed());
        assert!(!ConfirmForm::default().confirmed());
    }

    #[test]
    fn test_list_query_params() {
        let query = ListQuery {
            search: Some("  phone ".to_string()),
            page: Some(0),
        };
        let params = query.params(25);
        assert_eq!(params.search, "phone");
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 25);
    }
}
