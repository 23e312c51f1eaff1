//! Category route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_core::{Category, CategoryId, CategoryInput, Pager};

use crate::{error::AppError, filters, middleware::RequireLogin, state::AppState};

use super::{ConfirmDeleteTemplate, ConfirmForm, ListQuery, NavView, PagerView, render};

/// Category view for templates.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name.clone(),
        }
    }
}

/// Categories list page template.
#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub nav: NavView,
    pub categories: Vec<CategoryView>,
    pub search: String,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// Category create/edit form template.
#[derive(Template)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub nav: NavView,
    pub heading: String,
    pub action: String,
    pub name: String,
    pub error: Option<String>,
}

/// Category form input.
#[derive(Debug, Deserialize)]
pub struct CategoryFormInput {
    pub name: String,
}

impl From<CategoryFormInput> for CategoryInput {
    fn from(input: CategoryFormInput) -> Self {
        Self {
            name: input.name.trim().to_string(),
        }
    }
}

/// Categories list page handler.
#[instrument(skip(login, state))]
pub async fn index(
    login: RequireLogin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let params = query.params(state.page_size());
    let mut pager = Pager::new(params.page);

    let (categories, error) = match login.api.list_categories(&params).await {
        Ok(list) => {
            pager.set_total_pages(list.total_pages);
            (list.data.iter().map(CategoryView::from).collect(), None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            (vec![], Some(e.user_message("Failed to fetch categories")))
        }
    };

    render(&CategoriesIndexTemplate {
        nav: NavView::new(&login.user, "/categories"),
        categories,
        pager: PagerView::new(&pager, "/categories", &[("search", &params.search)]),
        search: params.search,
        error,
    })
}

/// New category form handler.
pub async fn new_category(login: RequireLogin) -> Html<String> {
    render(&CategoryFormTemplate {
        nav: NavView::new(&login.user, "/categories"),
        heading: "New category".to_string(),
        action: "/categories".to_string(),
        name: String::new(),
        error: None,
    })
}

/// Create category handler.
#[instrument(skip(login, input))]
pub async fn create(login: RequireLogin, Form(input): Form<CategoryFormInput>) -> Response {
    let input = CategoryInput::from(input);
    match login.api.create_category(&input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            Redirect::to("/categories").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create category");
            render(&CategoryFormTemplate {
                nav: NavView::new(&login.user, "/categories"),
                heading: "New category".to_string(),
                action: "/categories".to_string(),
                name: input.name,
                error: Some(e.user_message("Failed to create category")),
            })
            .into_response()
        }
    }
}

/// Edit category form handler.
#[instrument(skip(login))]
pub async fn edit(login: RequireLogin, Path(id): Path<CategoryId>) -> Result<Html<String>, AppError> {
    let category = login.api.get_category(id).await?;
    Ok(render(&CategoryFormTemplate {
        nav: NavView::new(&login.user, "/categories"),
        heading: format!("Edit category #{id}"),
        action: format!("/categories/{id}"),
        name: category.name,
        error: None,
    }))
}

/// Update category handler.
#[instrument(skip(login, input))]
pub async fn update(
    login: RequireLogin,
    Path(id): Path<CategoryId>,
    Form(input): Form<CategoryFormInput>,
) -> Response {
    let input = CategoryInput::from(input);
    match login.api.update_category(id, &input).await {
        Ok(_) => {
            tracing::info!(category_id = %id, "Category updated");
            Redirect::to("/categories").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update category");
            render(&CategoryFormTemplate {
                nav: NavView::new(&login.user, "/categories"),
                heading: format!("Edit category #{id}"),
                action: format!("/categories/{id}"),
                name: input.name,
                error: Some(e.user_message("Failed to update category")),
            })
            .into_response()
        }
    }
}

fn delete_page(login: &RequireLogin, id: CategoryId, message: String) -> ConfirmDeleteTemplate {
    ConfirmDeleteTemplate::new(
        NavView::new(&login.user, "/categories"),
        "Delete category",
        message,
        format!("/categories/{id}/delete"),
        "/categories",
    )
}

/// Category deletion confirmation page.
#[instrument(skip(login))]
pub async fn confirm_delete(
    login: RequireLogin,
    Path(id): Path<CategoryId>,
) -> Result<Html<String>, AppError> {
    let category = login.api.get_category(id).await?;
    Ok(render(&delete_page(
        &login,
        id,
        format!("Delete the category \"{}\"?", category.name),
    )))
}

/// Delete category handler. Without `confirm=yes` nothing is deleted.
#[instrument(skip(login, form))]
pub async fn delete(
    login: RequireLogin,
    Path(id): Path<CategoryId>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !form.confirmed() {
        return Redirect::to("/categories").into_response();
    }
    match login.api.delete_category(id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            Redirect::to("/categories").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete category");
            let page = delete_page(&login, id, format!("Delete category #{id}?"))
                .with_error(e.user_message("Failed to delete category"));
            render(&page).into_response()
        }
    }
}
