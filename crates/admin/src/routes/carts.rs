//! Cart route handlers.
//!
//! Cart lines are edited as text, one `product_id quantity` pair per line.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_core::{Cart, CartId, CartInput, Pager, ProductId, format_money};

use crate::{error::AppError, filters, middleware::RequireLogin, state::AppState};

use super::{ConfirmDeleteTemplate, ConfirmForm, NavView, PagerView, render};

/// `?page=` query of the carts list.
#[derive(Debug, Default, Deserialize)]
pub struct CartsQuery {
    pub page: Option<u32>,
}

/// Cart line view for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub quantity: i64,
    pub subtotal: String,
}

/// Cart view for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub id: i32,
    pub user_id: i32,
    pub created_at: String,
    pub total: String,
    pub units: i64,
    pub lines: Vec<CartLineView>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id.as_i32(),
            user_id: cart.user_id.as_i32(),
            created_at: cart.created_at.display_short(),
            total: format_money(cart.total_amount),
            units: cart.unit_count(),
            lines: cart
                .items
                .iter()
                .map(|item| CartLineView {
                    product_id: item.product_id.as_i32(),
                    quantity: item.quantity,
                    subtotal: format_money(item.subtotal),
                })
                .collect(),
        }
    }
}

/// Carts list page template.
#[derive(Template)]
#[template(path = "carts/index.html")]
pub struct CartsIndexTemplate {
    pub nav: NavView,
    pub carts: Vec<CartView>,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// Cart create/edit form template.
#[derive(Template)]
#[template(path = "carts/form.html")]
pub struct CartFormTemplate {
    pub nav: NavView,
    pub heading: String,
    pub action: String,
    pub lines: String,
    pub error: Option<String>,
}

/// Cart form input.
#[derive(Debug, Deserialize)]
pub struct CartFormInput {
    #[serde(default)]
    pub lines: String,
}

/// Parse `product_id quantity` lines into a cart request.
///
/// Blank lines are skipped; `,`, `x` and `:` are accepted as separators.
///
/// # Errors
///
/// Returns a message naming the first malformed line.
pub fn parse_cart_lines(text: &str) -> Result<CartInput, String> {
    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let invalid = || format!("Line {}: expected \"product_id quantity\"", number + 1);

        let mut parts = line
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | 'x' | ':'))
            .filter(|part| !part.is_empty());
        let (Some(product), Some(quantity), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let product_id: ProductId = product.parse().map_err(|_| invalid())?;
        let quantity: i64 = quantity.parse().map_err(|_| invalid())?;
        if quantity < 1 {
            return Err(format!("Line {}: quantity must be at least 1", number + 1));
        }
        pairs.push((product_id, quantity));
    }

    if pairs.is_empty() {
        return Err("A cart needs at least one line".to_string());
    }
    Ok(CartInput::from_pairs(pairs))
}

/// Render a cart back into editable lines.
fn cart_lines(cart: &Cart) -> String {
    cart.items
        .iter()
        .map(|item| format!("{} {}", item.product_id, item.quantity))
        .collect::<Vec<_>>()
        .join("\n")
}

fn form_page(login: &RequireLogin, id: Option<CartId>, lines: String) -> CartFormTemplate {
    let (heading, action) = id.map_or_else(
        || ("New cart".to_string(), "/carts".to_string()),
        |id| (format!("Edit cart #{id}"), format!("/carts/{id}")),
    );
    CartFormTemplate {
        nav: NavView::new(&login.user, "/carts"),
        heading,
        action,
        lines,
        error: None,
    }
}

/// Carts list page handler.
#[instrument(skip(login, state))]
pub async fn index(
    login: RequireLogin,
    State(state): State<AppState>,
    Query(query): Query<CartsQuery>,
) -> Html<String> {
    let mut pager = Pager::new(query.page.unwrap_or(1));

    let (carts, error) = match login.api.list_carts(pager.page(), state.page_size()).await {
        Ok(list) => {
            pager.set_total_pages(list.total_pages);
            (list.data.iter().map(CartView::from).collect(), None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch carts: {e}");
            (vec![], Some(e.user_message("Failed to fetch carts")))
        }
    };

    render(&CartsIndexTemplate {
        nav: NavView::new(&login.user, "/carts"),
        carts,
        pager: PagerView::new(&pager, "/carts", &[]),
        error,
    })
}

/// New cart form handler.
pub async fn new_cart(login: RequireLogin) -> Html<String> {
    render(&form_page(&login, None, String::new()))
}

/// Create cart handler.
#[instrument(skip(login, form))]
pub async fn create(login: RequireLogin, Form(form): Form<CartFormInput>) -> Response {
    let result = match parse_cart_lines(&form.lines) {
        Ok(input) => login
            .api
            .create_cart(&input)
            .await
            .map_err(|e| e.user_message("Failed to create cart")),
        Err(message) => Err(message),
    };

    match result {
        Ok(cart) => {
            tracing::info!(cart_id = %cart.id, "Cart created");
            Redirect::to("/carts").into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Cart not created");
            let mut page = form_page(&login, None, form.lines);
            page.error = Some(message);
            render(&page).into_response()
        }
    }
}

/// Edit cart form handler.
#[instrument(skip(login))]
pub async fn edit(login: RequireLogin, Path(id): Path<CartId>) -> Result<Html<String>, AppError> {
    let cart = login.api.get_cart(id).await?;
    Ok(render(&form_page(&login, Some(id), cart_lines(&cart))))
}

/// Replace a cart's lines.
#[instrument(skip(login, form))]
pub async fn update(
    login: RequireLogin,
    Path(id): Path<CartId>,
    Form(form): Form<CartFormInput>,
) -> Response {
    let result = match parse_cart_lines(&form.lines) {
        Ok(input) => login
            .api
            .update_cart(id, &input)
            .await
            .map_err(|e| e.user_message("Failed to update cart")),
        Err(message) => Err(message),
    };

    match result {
        Ok(_) => {
            tracing::info!(cart_id = %id, "Cart updated");
            Redirect::to("/carts").into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Cart not updated");
            let mut page = form_page(&login, Some(id), form.lines);
            page.error = Some(message);
            render(&page).into_response()
        }
    }
}

fn delete_page(login: &RequireLogin, id: CartId, message: String) -> ConfirmDeleteTemplate {
    ConfirmDeleteTemplate::new(
        NavView::new(&login.user, "/carts"),
        "Delete cart",
        message,
        format!("/carts/{id}/delete"),
        "/carts",
    )
}

/// Cart deletion confirmation page.
#[instrument(skip(login))]
pub async fn confirm_delete(
    login: RequireLogin,
    Path(id): Path<CartId>,
) -> Result<Html<String>, AppError> {
    let cart = login.api.get_cart(id).await?;
    Ok(render(&delete_page(
        &login,
        id,
        format!(
            "Delete cart #{id} ({} units, {})?",
            cart.unit_count(),
            format_money(cart.total_amount)
        ),
    )))
}

/// Delete cart handler. Without `confirm=yes` nothing is deleted.
#[instrument(skip(login, form))]
pub async fn delete(
    login: RequireLogin,
    Path(id): Path<CartId>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !form.confirmed() {
        return Redirect::to("/carts").into_response();
    }
    match login.api.delete_cart(id).await {
        Ok(()) => {
            tracing::info!(cart_id = %id, "Cart deleted");
            Redirect::to("/carts").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete cart");
            let page = delete_page(&login, id, format!("Delete cart #{id}?"))
                .with_error(e.user_message("Failed to delete cart"));
            render(&page).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart_lines() {
        let input = parse_cart_lines("3 2\n\n  7,1 \n12x4").unwrap();
        assert_eq!(input.cart_items.len(), 3);
        assert_eq!(input.cart_items[0].product_id, ProductId::new(3));
        assert_eq!(input.cart_items[0].quantity, 2);
        assert_eq!(input.cart_items[1].product_id, ProductId::new(7));
        assert_eq!(input.cart_items[2].quantity, 4);
    }

    #[test]
    fn test_parse_cart_lines_names_bad_line() {
        let err = parse_cart_lines("3 2\nphone 1").unwrap_err();
        assert!(err.starts_with("Line 2"), "{err}");
    }

    #[test]
    fn test_parse_cart_lines_rejects_zero_quantity() {
        assert!(parse_cart_lines("3 0").unwrap_err().contains("at least 1"));
    }

    #[test]
    fn test_parse_cart_lines_rejects_empty() {
        assert!(parse_cart_lines(" \n ").is_err());
        assert!(parse_cart_lines("3 2 9").is_err());
    }
}
