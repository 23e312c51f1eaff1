//! Semantic search pages: free text and voice.
//!
//! Voice clips arrive as the multipart field `file`, either picked from disk
//! or recorded in the browser. Both variants post the same form, so one
//! handler serves them.

use askama::Template;
use axum::{
    extract::{Multipart, Query, multipart::MultipartError},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_client::{ApiError, DEFAULT_SEARCH_LIMIT, VoiceClip};
use shopkeeper_core::{ListResponse, Product};

use crate::{error::AppError, filters, middleware::RequireLogin};

use super::{NavView, products::ProductView, render};

/// Largest result count a page may ask for.
const MAX_RESULTS: u32 = 50;

/// `?q=&limit=` query of the text search page.
#[derive(Debug, Default, Deserialize)]
pub struct TextSearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// Ranked search results, shared by both pages.
#[derive(Template)]
#[template(path = "search/_results.html")]
pub struct SearchResultsTemplate {
    pub searched: bool,
    pub products: Vec<ProductView>,
    pub error: Option<String>,
}

impl SearchResultsTemplate {
    const fn empty() -> Self {
        Self {
            searched: false,
            products: Vec::new(),
            error: None,
        }
    }

    fn from_result(result: Result<ListResponse<Product>, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(list) => Self {
                searched: true,
                products: list.data.iter().map(ProductView::from).collect(),
                error: None,
            },
            Err(e) => {
                tracing::error!("Search failed: {e}");
                Self {
                    searched: true,
                    products: Vec::new(),
                    error: Some(e.user_message(fallback)),
                }
            }
        }
    }
}

/// Text search page template.
#[derive(Template)]
#[template(path = "search/text.html")]
pub struct TextSearchTemplate {
    pub nav: NavView,
    pub query: String,
    pub limit: u32,
    pub results: SearchResultsTemplate,
}

/// Voice search page template.
#[derive(Template)]
#[template(path = "search/voice.html")]
pub struct VoiceSearchTemplate {
    pub nav: NavView,
    pub limit: u32,
    pub results: SearchResultsTemplate,
}

/// Text search page handler. An empty query renders the form only.
#[instrument(skip(login))]
pub async fn text_search(
    login: RequireLogin,
    Query(query): Query<TextSearchQuery>,
) -> Html<String> {
    let text = query.q.as_deref().unwrap_or_default().trim().to_string();
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_RESULTS);

    let results = if text.is_empty() {
        SearchResultsTemplate::empty()
    } else {
        SearchResultsTemplate::from_result(
            login.api.text_search(&text, limit).await,
            "Failed to search products",
        )
    };

    render(&TextSearchTemplate {
        nav: NavView::new(&login.user, "/text_search"),
        query: text,
        limit,
        results,
    })
}

/// Voice search page handler.
pub async fn voice_page(login: RequireLogin) -> Html<String> {
    render(&VoiceSearchTemplate {
        nav: NavView::new(&login.user, "/voice_search"),
        limit: DEFAULT_SEARCH_LIMIT,
        results: SearchResultsTemplate::empty(),
    })
}

/// Fields of the voice search form.
struct VoiceForm {
    clip: Option<VoiceClip>,
    limit: u32,
}

async fn read_voice_form(mut multipart: Multipart) -> Result<VoiceForm, MultipartError> {
    let mut form = VoiceForm {
        clip: None,
        limit: DEFAULT_SEARCH_LIMIT,
    };

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("recording.webm").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.clip = Some(VoiceClip::new(bytes.to_vec(), file_name, mime));
                }
            }
            Some("limit") => {
                if let Ok(limit) = field.text().await?.trim().parse::<u32>() {
                    form.limit = limit.clamp(1, MAX_RESULTS);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Voice search upload handler.
///
/// htmx requests (the in-browser recorder) get only the results fragment.
#[instrument(skip_all)]
pub async fn voice_search(
    login: RequireLogin,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_voice_form(multipart)
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;

    let results = match form.clip {
        Some(clip) => {
            tracing::info!(file_name = %clip.file_name(), bytes = clip.len(), "Voice search");
            SearchResultsTemplate::from_result(
                login.api.voice_search(clip, form.limit).await,
                "Failed to search by voice",
            )
        }
        None => SearchResultsTemplate {
            searched: true,
            products: Vec::new(),
            error: Some("Choose or record an audio clip first".to_string()),
        },
    };

    if headers.contains_key("HX-Request") {
        return Ok(render(&results).into_response());
    }

    Ok(render(&VoiceSearchTemplate {
        nav: NavView::new(&login.user, "/voice_search"),
        limit: form.limit,
        results,
    })
    .into_response())
}
