//! Product route handlers, including the live search fragment and the
//! comment analysis page.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_client::{ApiClient, Outcome};
use shopkeeper_core::{
    AiAnalysis, CategoryId, ListParams, Pager, Product, ProductId, ProductInput, format_money,
};

use crate::{error::AppError, filters, middleware::RequireLogin, state::AppState};

use super::{ConfirmDeleteTemplate, ConfirmForm, ListQuery, NavView, PagerView, render};

/// Product view for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub title: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    pub sale_price: String,
    pub discount: String,
    pub has_discount: bool,
    pub stock: i64,
    pub rating: String,
    pub thumbnail: String,
    pub is_published: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            category: product.category.name.clone(),
            price: format_money(product.price),
            sale_price: format_money(product.sale_price()),
            discount: format!("{:.0}%", product.discount_percentage),
            has_discount: product.discount_percentage > 0.0,
            stock: product.stock,
            rating: format!("{:.1}", product.rating),
            thumbnail: product.thumbnail.clone(),
            is_published: product.is_published,
        }
    }
}

/// Category choice in the product form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
    pub selected: bool,
}

/// Products list page template.
///
/// Embeds `products/_results.html`, which `/products/live` re-renders.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: NavView,
    pub products: Vec<ProductView>,
    pub search: String,
    pub pager: PagerView,
    pub error: Option<String>,
    pub debounce_ms: u128,
}

/// Search results fragment swapped in by htmx.
#[derive(Template)]
#[template(path = "products/_results.html")]
pub struct ProductResultsTemplate {
    pub products: Vec<ProductView>,
    pub search: String,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub nav: NavView,
    pub heading: String,
    pub action: String,
    pub form: ProductFormInput,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

/// Label with its comment count.
#[derive(Debug, Clone)]
pub struct LabelCount {
    pub label: String,
    pub count: u32,
}

/// Analysis view for templates.
#[derive(Debug, Clone)]
pub struct AnalysisView {
    pub score: String,
    pub mood: &'static str,
    pub comment_count: u32,
    pub label_counts: Vec<LabelCount>,
    pub summary: String,
}

impl From<&AiAnalysis> for AnalysisView {
    fn from(analysis: &AiAnalysis) -> Self {
        let mood = if analysis.sentiment_score_avg > 0.0 {
            "positive"
        } else if analysis.sentiment_score_avg < 0.0 {
            "negative"
        } else {
            "neutral"
        };
        Self {
            score: format!("{:+.2}", analysis.sentiment_score_avg),
            mood,
            comment_count: analysis.comment_count(),
            label_counts: analysis
                .sentiment_label_counts
                .iter()
                .map(|(label, count)| LabelCount {
                    label: label.to_lowercase(),
                    count: *count,
                })
                .collect(),
            summary: analysis.comments_summary.clone(),
        }
    }
}

/// Comment analysis page template.
#[derive(Template)]
#[template(path = "products/analysis.html")]
pub struct AnalysisTemplate {
    pub nav: NavView,
    pub product: ProductView,
    pub analysis: Option<AnalysisView>,
}

/// Product form input.
///
/// Numeric fields arrive as text so a typo re-renders the form instead of
/// failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFormInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub discount_percentage: String,
    #[serde(default)]
    pub rating: String,
    pub stock: String,
    pub brand: String,
    pub thumbnail: String,
    /// One image URL per line.
    #[serde(default)]
    pub images: String,
    /// Checkbox; present when ticked.
    pub is_published: Option<String>,
    pub category_id: String,
}

impl ProductFormInput {
    /// Validate the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first field that does not parse.
    pub fn to_input(&self) -> Result<ProductInput, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let price: Decimal = parse_field("Price", &self.price)?;
        let discount_percentage: f64 = parse_optional("Discount", &self.discount_percentage)?;
        let description = self.description.trim();

        Ok(ProductInput {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            price,
            discount_percentage,
            rating: parse_optional("Rating", &self.rating)?,
            stock: parse_field("Stock", &self.stock)?,
            brand: self.brand.trim().to_string(),
            thumbnail: self.thumbnail.trim().to_string(),
            images: self
                .images
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            is_published: self.is_published.is_some(),
            category_id: parse_field("Category", &self.category_id)?,
        })
    }

    /// Whether the published checkbox is ticked.
    #[must_use]
    pub const fn published(&self) -> bool {
        self.is_published.is_some()
    }
}

impl From<&Product> for ProductFormInput {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            discount_percentage: product.discount_percentage.to_string(),
            rating: product.rating.to_string(),
            stock: product.stock.to_string(),
            brand: product.brand.clone(),
            thumbnail: product.thumbnail.clone(),
            images: product.images.join("\n"),
            is_published: product.is_published.then(|| "on".to_string()),
            category_id: product.category.id.to_string(),
        }
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{name} is not a valid number"))
}

fn parse_optional<T: std::str::FromStr + Default>(name: &str, value: &str) -> Result<T, String> {
    if value.trim().is_empty() {
        Ok(T::default())
    } else {
        parse_field(name, value)
    }
}

/// Category choices for the product form, with `selected` preselected.
async fn category_options(api: &ApiClient, selected: &str) -> Vec<CategoryOption> {
    let params = ListParams::new(1, ListParams::MAX_LIMIT);
    match api.list_categories(&params).await {
        Ok(list) => list
            .data
            .iter()
            .map(|category| CategoryOption {
                id: category.id.as_i32(),
                name: category.name.clone(),
                selected: selected.parse::<CategoryId>().is_ok_and(|id| id == category.id),
            })
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            vec![]
        }
    }
}

/// Fetch one page of products and turn it into the results fragment.
async fn fetch_results(api: &ApiClient, params: &ListParams) -> ProductResultsTemplate {
    let mut pager = Pager::new(params.page);
    let (products, error) = match api.list_products(params).await {
        Ok(list) => {
            pager.set_total_pages(list.total_pages);
            (list.data.iter().map(ProductView::from).collect(), None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (vec![], Some(e.user_message("Failed to fetch products")))
        }
    };

    ProductResultsTemplate {
        products,
        pager: PagerView::new(&pager, "/products", &[("search", &params.search)]),
        search: params.search.clone(),
        error,
    }
}

/// Products list page handler.
#[instrument(skip(login, state))]
pub async fn index(
    login: RequireLogin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let params = query.params(state.page_size());
    let results = fetch_results(&login.api, &params).await;

    render(&ProductsIndexTemplate {
        nav: NavView::new(&login.user, "/products"),
        products: results.products,
        search: results.search,
        pager: results.pager,
        error: results.error,
        debounce_ms: state.config().search_debounce.as_millis(),
    })
}

/// Live search fragment handler.
///
/// The browser debounces keystrokes; a newer request from the same session
/// aborts this one, which then answers `204 No Content` so htmx swaps nothing.
#[instrument(skip(login, state), fields(search_key = %login.user.search_key))]
pub async fn live(
    login: RequireLogin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let params = query.params(state.page_size());
    let api = login.api.clone();
    let key = login.user.search_key.to_string();

    let outcome = state
        .searches()
        .run(&key, async move { fetch_results(&api, &params).await })
        .await;

    match outcome {
        Outcome::Completed(results) => render(&results).into_response(),
        Outcome::Superseded => {
            tracing::debug!("Live search superseded");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// New product form handler.
pub async fn new_product(login: RequireLogin) -> Html<String> {
    let form = ProductFormInput {
        is_published: Some("on".to_string()),
        ..ProductFormInput::default()
    };
    render(&ProductFormTemplate {
        nav: NavView::new(&login.user, "/products"),
        heading: "New product".to_string(),
        action: "/products".to_string(),
        categories: category_options(&login.api, &form.category_id).await,
        form,
        error: None,
    })
}

/// Create product handler.
#[instrument(skip(login, form))]
pub async fn create(login: RequireLogin, Form(form): Form<ProductFormInput>) -> Response {
    let result = match form.to_input() {
        Ok(input) => login
            .api
            .create_product(&input)
            .await
            .map_err(|e| e.user_message("Failed to create product")),
        Err(message) => Err(message),
    };

    match result {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product created");
            Redirect::to("/products").into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Product not created");
            render(&ProductFormTemplate {
                nav: NavView::new(&login.user, "/products"),
                heading: "New product".to_string(),
                action: "/products".to_string(),
                categories: category_options(&login.api, &form.category_id).await,
                form,
                error: Some(message),
            })
            .into_response()
        }
    }
}

/// Edit product form handler.
#[instrument(skip(login))]
pub async fn edit(login: RequireLogin, Path(id): Path<ProductId>) -> Result<Html<String>, AppError> {
    let product = login.api.get_product(id).await?;
    let form = ProductFormInput::from(&product);
    Ok(render(&ProductFormTemplate {
        nav: NavView::new(&login.user, "/products"),
        heading: format!("Edit product #{id}"),
        action: format!("/products/{id}"),
        categories: category_options(&login.api, &form.category_id).await,
        form,
        error: None,
    }))
}

/// Update product handler.
#[instrument(skip(login, form))]
pub async fn update(
    login: RequireLogin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductFormInput>,
) -> Response {
    let result = match form.to_input() {
        Ok(input) => login
            .api
            .update_product(id, &input)
            .await
            .map_err(|e| e.user_message("Failed to update product")),
        Err(message) => Err(message),
    };

    match result {
        Ok(_) => {
            tracing::info!(product_id = %id, "Product updated");
            Redirect::to("/products").into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Product not updated");
            render(&ProductFormTemplate {
                nav: NavView::new(&login.user, "/products"),
                heading: format!("Edit product #{id}"),
                action: format!("/products/{id}"),
                categories: category_options(&login.api, &form.category_id).await,
                form,
                error: Some(message),
            })
            .into_response()
        }
    }
}

fn delete_page(login: &RequireLogin, id: ProductId, message: String) -> ConfirmDeleteTemplate {
    ConfirmDeleteTemplate::new(
        NavView::new(&login.user, "/products"),
        "Delete product",
        message,
        format!("/products/{id}/delete"),
        "/products",
    )
}

/// Product deletion confirmation page.
#[instrument(skip(login))]
pub async fn confirm_delete(
    login: RequireLogin,
    Path(id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let product = login.api.get_product(id).await?;
    Ok(render(&delete_page(
        &login,
        id,
        format!(
            "Delete \"{}\"? Its comments are deleted with it.",
            product.title
        ),
    )))
}

/// Delete product handler. Without `confirm=yes` nothing is deleted.
#[instrument(skip(login, form))]
pub async fn delete(
    login: RequireLogin,
    Path(id): Path<ProductId>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !form.confirmed() {
        return Redirect::to("/products").into_response();
    }
    match login.api.delete_product(id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            Redirect::to("/products").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete product");
            let page = delete_page(&login, id, format!("Delete product #{id}?"))
                .with_error(e.user_message("Failed to delete product"));
            render(&page).into_response()
        }
    }
}

/// Comment analysis page handler.
///
/// Products without comments have no analysis; the page says so.
#[instrument(skip(login))]
pub async fn ai_analysis(
    login: RequireLogin,
    Path(product_id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let (product, analysis) = match login.api.ai_analysis(product_id).await? {
        Some(analysis) => (
            ProductView::from(&analysis.product),
            Some(AnalysisView::from(&analysis)),
        ),
        None => (
            ProductView::from(&login.api.get_product(product_id).await?),
            None,
        ),
    };

    Ok(render(&AnalysisTemplate {
        nav: NavView::new(&login.user, "/products"),
        product,
        analysis,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_form() -> ProductFormInput {
        ProductFormInput {
            title: " Phone X ".to_string(),
            description: String::new(),
            price: "499.99".to_string(),
            discount_percentage: "10".to_string(),
            rating: String::new(),
            stock: "12".to_string(),
            brand: "Acme".to_string(),
            thumbnail: "https://img.example/x.png".to_string(),
            images: "https://img.example/1.png\n\n  https://img.example/2.png  \n".to_string(),
            is_published: None,
            category_id: "3".to_string(),
        }
    }

    #[test]
    fn test_form_to_input() {
        let input = filled_form().to_input().unwrap();
        assert_eq!(input.title, "Phone X");
        assert_eq!(input.price, Decimal::new(49999, 2));
        assert!(input.description.is_none());
        assert!((input.rating - 0.0).abs() < f64::EPSILON);
        assert_eq!(input.images.len(), 2);
        assert!(!input.is_published);
        assert_eq!(input.category_id, CategoryId::new(3));
    }

    #[test]
    fn test_form_rejects_bad_price() {
        let form = ProductFormInput {
            price: "12,50".to_string(),
            ..filled_form()
        };
        assert_eq!(form.to_input().unwrap_err(), "Price is not a valid number");
    }

    #[test]
    fn test_form_passes_discount_range_to_backend() {
        let form = ProductFormInput {
            discount_percentage: "150".to_string(),
            ..filled_form()
        };
        let input = form.to_input().unwrap();
        assert!((input.discount_percentage - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_form_rejects_unparsable_discount() {
        let form = ProductFormInput {
            discount_percentage: "ten".to_string(),
            ..filled_form()
        };
        assert!(form.to_input().unwrap_err().starts_with("Discount"));
    }

    #[test]
    fn test_form_requires_title() {
        let form = ProductFormInput {
            title: "   ".to_string(),
            ..filled_form()
        };
        assert!(form.to_input().is_err());
    }
}
