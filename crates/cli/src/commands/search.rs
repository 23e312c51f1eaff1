//! `sk search ...`
//!
//! `live` reads the search box contents from stdin, one line per keystroke,
//! and prints the result list each time it settles. `:next`, `:prev` and
//! `:refresh` page and refetch; `:quit` (or end of input) stops.

use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use shopkeeper_client::{
    ApiClient, DEFAULT_SEARCH_LIMIT, LiveSearch, SearchPhase, SearchView, VoiceClip,
};
use shopkeeper_core::{ListParams, Product};

use super::{CliError, print_json};

#[derive(Debug, Subcommand)]
pub enum SearchAction {
    /// Rank products by similarity to a description
    Text {
        /// What to look for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Transcribe an audio clip and search with the transcript
    Voice {
        /// Audio file (wav, mp3, m4a, ogg, webm, flac)
        file: PathBuf,

        /// Number of results
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Debounced search-as-you-type over the product list
    Live {
        /// Quiet time before a query is sent, in milliseconds
        #[arg(long, env = "SHOPKEEPER_SEARCH_DEBOUNCE_MS", default_value_t = 300)]
        debounce_ms: u64,

        /// Page size (1-100)
        #[arg(short, long, default_value_t = ListParams::DEFAULT_LIMIT)]
        limit: u32,
    },
}

/// One settled live search result.
#[derive(Serialize)]
struct LiveOutput<'a> {
    query: &'a str,
    page: u32,
    requests: u64,
    error: Option<&'a str>,
    items: &'a [Product],
}

impl<'a> From<&'a SearchView<Product>> for LiveOutput<'a> {
    fn from(view: &'a SearchView<Product>) -> Self {
        // Label the items with what they were fetched for.
        let (query, page) = view
            .results_for
            .as_ref()
            .map_or((view.query.as_str(), view.pager.page()), |r| (r.query.as_str(), r.page));
        Self {
            query,
            page,
            requests: view.requests,
            error: view.error.as_deref(),
            items: &view.items,
        }
    }
}

/// Whether `view` answers the latest command: fresh items for the current
/// query and page, or the error from its request.
fn is_answered(view: &SearchView<Product>) -> bool {
    match view.phase {
        SearchPhase::Displaying => view.is_current(),
        SearchPhase::ErrorDisplaying => true,
        _ => false,
    }
}

/// Run a search command.
///
/// # Errors
///
/// Returns an error if the clip cannot be read, or the API call or output
/// fails.
pub async fn run(api: &ApiClient, action: SearchAction) -> Result<(), CliError> {
    match action {
        SearchAction::Text { query, limit } => {
            print_json(&api.text_search(&query.join(" "), limit).await?)
        }
        SearchAction::Voice { file, limit } => {
            let clip = VoiceClip::from_path(&file).await?;
            tracing::info!(file = %file.display(), bytes = clip.len(), "Uploading clip");
            print_json(&api.voice_search(clip, limit).await?)
        }
        SearchAction::Live { debounce_ms, limit } => {
            live(api, Duration::from_millis(debounce_ms), limit).await
        }
    }
}

async fn live(api: &ApiClient, debounce: Duration, limit: u32) -> Result<(), CliError> {
    let fetch_api = api.clone();
    let search = LiveSearch::spawn(
        move |query: String, page: u32| {
            let api = fetch_api.clone();
            async move {
                let params = ListParams::new(page, limit).with_search(query);
                api.list_products(&params).await
            }
        },
        debounce,
    );

    let mut views = search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    // A command was sent whose result has not been printed yet
    let mut pending = false;
    let mut last_query = String::new();

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match line.trim() {
                    ":quit" => break,
                    ":next" => {
                        search.next_page();
                        pending |= views.borrow().pager.has_next();
                    }
                    ":prev" => {
                        search.prev_page();
                        pending |= views.borrow().pager.has_prev();
                    }
                    ":refresh" => {
                        search.refresh();
                        pending = true;
                    }
                    text => {
                        search.type_query(text);
                        last_query = text.to_string();
                        pending = true;
                    }
                },
                None => {
                    // Let the last query finish before exiting
                    stdin_open = false;
                    if !pending {
                        break;
                    }
                }
            },
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if view.requests > 0 && is_answered(&view) {
                    print_json(&LiveOutput::from(&view))?;
                    pending &= view.query != last_query;
                    if !stdin_open && !pending {
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use shopkeeper_client::ResultsFor;

    use super::*;

    fn view(phase: SearchPhase, query: &str, fetched_for: &str) -> SearchView<Product> {
        SearchView {
            phase,
            query: query.to_string(),
            results_for: Some(ResultsFor {
                query: fetched_for.to_string(),
                page: 1,
            }),
            requests: 1,
            ..SearchView::default()
        }
    }

    #[test]
    fn test_only_results_for_the_current_query_count_as_answered() {
        assert!(is_answered(&view(SearchPhase::Displaying, "phones", "phones")));
        assert!(!is_answered(&view(SearchPhase::Displaying, "phones", "phone")));
        assert!(!is_answered(&view(SearchPhase::Debouncing, "phones", "phone")));
        assert!(is_answered(&view(SearchPhase::ErrorDisplaying, "phones", "phone")));
    }

    #[test]
    fn test_output_is_labelled_with_the_fetched_query() {
        let stale = view(SearchPhase::Debouncing, "phones", "phone");
        let output = LiveOutput::from(&stale);
        assert_eq!(output.query, "phone");
        assert_eq!(output.page, 1);
    }
}
