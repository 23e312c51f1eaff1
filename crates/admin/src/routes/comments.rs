//! Product comment route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_core::{Comment, CommentId, CommentInput, Pager, ProductId};

use crate::{error::AppError, filters, middleware::RequireLogin, state::AppState};

use super::{ConfirmDeleteTemplate, ConfirmForm, NavView, PagerView, render};

/// `?page=` query of the comments list.
#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    pub page: Option<u32>,
}

/// Comment view for templates.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: i32,
    pub content: String,
    pub rating: String,
    pub created_at: String,
    pub sentiment: &'static str,
    pub sentiment_score: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.as_i32(),
            content: comment.content.clone(),
            rating: format!("{:.1}", comment.rating),
            created_at: comment.created_at.display_short(),
            sentiment: comment.sentiment_label.as_str(),
            sentiment_score: format!("{:.2}", comment.sentiment_score),
        }
    }
}

/// Comments list page template.
#[derive(Template)]
#[template(path = "comments/index.html")]
pub struct CommentsIndexTemplate {
    pub nav: NavView,
    pub product_id: i32,
    pub product_title: String,
    pub comments: Vec<CommentView>,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// Comment create/edit form template.
#[derive(Template)]
#[template(path = "comments/form.html")]
pub struct CommentFormTemplate {
    pub nav: NavView,
    pub heading: String,
    pub action: String,
    pub cancel_url: String,
    pub content: String,
    pub rating: String,
    pub error: Option<String>,
}

/// Comment form input.
#[derive(Debug, Deserialize)]
pub struct CommentFormInput {
    pub content: String,
    pub rating: String,
}

impl CommentFormInput {
    /// Validate the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns a message when the content is blank or the rating is not a
    /// number. The backend owns range checks.
    pub fn to_input(&self) -> Result<CommentInput, String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err("Comment text is required".to_string());
        }
        let rating: f64 = self
            .rating
            .trim()
            .parse()
            .map_err(|_| "Rating is not a valid number".to_string())?;
        Ok(CommentInput {
            content: content.to_string(),
            rating,
        })
    }
}

fn list_url(product_id: ProductId) -> String {
    format!("/comments/{product_id}")
}

fn form_page(
    login: &RequireLogin,
    product_id: ProductId,
    id: Option<CommentId>,
    content: String,
    rating: String,
) -> CommentFormTemplate {
    let (heading, action) = id.map_or_else(
        || {
            (
                format!("New comment on product #{product_id}"),
                list_url(product_id),
            )
        },
        |id| {
            (
                format!("Edit comment #{id}"),
                format!("/comments/{product_id}/{id}"),
            )
        },
    );
    CommentFormTemplate {
        nav: NavView::new(&login.user, "/products"),
        heading,
        action,
        cancel_url: list_url(product_id),
        content,
        rating,
        error: None,
    }
}

/// A product's comments.
#[instrument(skip(login, state))]
pub async fn index(
    login: RequireLogin,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(query): Query<CommentsQuery>,
) -> Result<Html<String>, AppError> {
    let product = login.api.get_product(product_id).await?;
    let mut pager = Pager::new(query.page.unwrap_or(1));

    let (comments, error) = match login
        .api
        .list_comments(product_id, pager.page(), state.page_size())
        .await
    {
        Ok(list) => {
            pager.set_total_pages(list.total_pages);
            (list.data.iter().map(CommentView::from).collect(), None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch comments: {e}");
            (vec![], Some(e.user_message("Failed to fetch comments")))
        }
    };

    Ok(render(&CommentsIndexTemplate {
        nav: NavView::new(&login.user, "/products"),
        product_id: product_id.as_i32(),
        product_title: product.title,
        comments,
        pager: PagerView::new(&pager, &list_url(product_id), &[]),
        error,
    }))
}

/// New comment form handler.
pub async fn new_comment(login: RequireLogin, Path(product_id): Path<ProductId>) -> Html<String> {
    render(&form_page(
        &login,
        product_id,
        None,
        String::new(),
        "5".to_string(),
    ))
}

/// Post comment handler.
#[instrument(skip(login, form))]
pub async fn create(
    login: RequireLogin,
    Path(product_id): Path<ProductId>,
    Form(form): Form<CommentFormInput>,
) -> Response {
    let result = match form.to_input() {
        Ok(input) => login
            .api
            .create_comment(product_id, &input)
            .await
            .map_err(|e| e.user_message("Failed to post comment")),
        Err(message) => Err(message),
    };

    match result {
        Ok(comment) => {
            tracing::info!(comment_id = %comment.id, "Comment posted");
            Redirect::to(&list_url(product_id)).into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Comment not posted");
            let mut page = form_page(&login, product_id, None, form.content, form.rating);
            page.error = Some(message);
            render(&page).into_response()
        }
    }
}

/// Edit comment form handler.
#[instrument(skip(login))]
pub async fn edit(
    login: RequireLogin,
    Path((product_id, id)): Path<(ProductId, CommentId)>,
) -> Result<Html<String>, AppError> {
    let comment = login.api.get_comment(product_id, id).await?;
    let input = CommentInput::from(&comment);
    Ok(render(&form_page(
        &login,
        product_id,
        Some(id),
        input.content,
        input.rating.to_string(),
    )))
}

/// Update comment handler.
#[instrument(skip(login, form))]
pub async fn update(
    login: RequireLogin,
    Path((product_id, id)): Path<(ProductId, CommentId)>,
    Form(form): Form<CommentFormInput>,
) -> Response {
    let result = match form.to_input() {
        Ok(input) => login
            .api
            .update_comment(product_id, id, &input)
            .await
            .map_err(|e| e.user_message("Failed to update comment")),
        Err(message) => Err(message),
    };

    match result {
        Ok(_) => {
            tracing::info!(comment_id = %id, "Comment updated");
            Redirect::to(&list_url(product_id)).into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Comment not updated");
            let mut page = form_page(&login, product_id, Some(id), form.content, form.rating);
            page.error = Some(message);
            render(&page).into_response()
        }
    }
}

fn delete_page(
    login: &RequireLogin,
    product_id: ProductId,
    id: CommentId,
    message: String,
) -> ConfirmDeleteTemplate {
    ConfirmDeleteTemplate::new(
        NavView::new(&login.user, "/products"),
        "Delete comment",
        message,
        format!("/comments/{product_id}/{id}/delete"),
        &list_url(product_id),
    )
}

/// Comment deletion confirmation page.
#[instrument(skip(login))]
pub async fn confirm_delete(
    login: RequireLogin,
    Path((product_id, id)): Path<(ProductId, CommentId)>,
) -> Result<Html<String>, AppError> {
    let comment = login.api.get_comment(product_id, id).await?;
    Ok(render(&delete_page(
        &login,
        product_id,
        id,
        format!(
            "Delete this comment? \"{}\"",
            filters::truncate_chars(&comment.content, 80)
        ),
    )))
}

/// Delete comment handler. Without `confirm=yes` nothing is deleted.
///
/// Only a comment's author may delete it; the backend's refusal is shown on
/// the confirmation page.
#[instrument(skip(login, form))]
pub async fn delete(
    login: RequireLogin,
    Path((product_id, id)): Path<(ProductId, CommentId)>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !form.confirmed() {
        return Redirect::to(&list_url(product_id)).into_response();
    }
    match login.api.delete_comment(product_id, id).await {
        Ok(()) => {
            tracing::info!(comment_id = %id, "Comment deleted");
            Redirect::to(&list_url(product_id)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete comment");
            let page = delete_page(&login, product_id, id, format!("Delete comment #{id}?"))
                .with_error(e.user_message("Failed to delete comment"));
            render(&page).into_response()
        }
    }
}
