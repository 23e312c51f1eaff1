//! Debounced, paginated, cancellable search-as-you-type.
//!
//! A [`LiveSearch`] owns one background task that receives keystrokes and
//! paging commands over a channel and publishes a [`SearchView`] through a
//! `watch` channel:
//!
//! ```text
//! Idle -> Typing -> Debouncing -> Fetching -> Displaying
//!                      ^  |                 \-> ErrorDisplaying
//!                      +--+ (keystroke restarts the timer)
//! ```
//!
//! Keystrokes restart the debounce timer; only when it fires is a request
//! issued. Issuing a request aborts the one still in flight, so results are
//! always applied in request order.
//!
//! A response can land while a newer keystroke is still debouncing. It is
//! shown, but the phase stays `Debouncing` and [`SearchView::results_for`]
//! names the query the items belong to.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use shopkeeper_core::{ListResponse, Pager};

use crate::ApiError;

/// Debounce delay used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where a search box is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// Nothing typed yet.
    #[default]
    Idle,
    /// A keystroke arrived.
    Typing,
    /// Waiting for the input to settle.
    Debouncing,
    /// A request is in flight.
    Fetching,
    /// The latest response is shown.
    Displaying,
    /// The latest request failed; the previous list is still shown.
    ErrorDisplaying,
}

/// The query and page a result list was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsFor {
    pub query: String,
    pub page: u32,
}

/// Snapshot of a search box published after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchView<T> {
    pub phase: SearchPhase,
    pub query: String,
    pub pager: Pager,
    pub items: Vec<T>,
    /// What `items` were fetched for; `None` until the first response.
    pub results_for: Option<ResultsFor>,
    pub error: Option<String>,
    /// Number of requests issued so far.
    pub requests: u64,
}

impl<T> SearchView<T> {
    /// Whether the shown items answer the current query and page.
    #[must_use]
    pub fn is_current(&self) -> bool {
        matches!(
            self.phase,
            SearchPhase::Displaying | SearchPhase::ErrorDisplaying
        ) && self
            .results_for
            .as_ref()
            .is_some_and(|r| r.query == self.query && r.page == self.pager.page())
    }
}

impl<T> Default for SearchView<T> {
    fn default() -> Self {
        Self {
            phase: SearchPhase::Idle,
            query: String::new(),
            pager: Pager::default(),
            items: Vec::new(),
            results_for: None,
            error: None,
            requests: 0,
        }
    }
}

#[derive(Debug)]
enum Command {
    Query(String),
    NextPage,
    PrevPage,
    Refresh,
}

/// Handle to a running search box. Dropping it stops the task.
pub struct LiveSearch<T> {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<SearchView<T>>,
    task: JoinHandle<()>,
}

impl<T> LiveSearch<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a search box that calls `fetch(query, page)` once input settles
    /// for `debounce`.
    pub fn spawn<F, Fut>(fetch: F, debounce: Duration) -> Self
    where
        F: Fn(String, u32) -> Fut + Send + 'static,
        Fut: Future<Output = Result<ListResponse<T>, ApiError>> + Send + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let (tx, view) = watch::channel(SearchView::default());
        let task = tokio::spawn(run(rx, tx, fetch, debounce));
        Self {
            commands,
            view,
            task,
        }
    }

    /// Record the search box's new contents (one call per keystroke).
    pub fn type_query(&self, query: impl Into<String>) {
        self.send(Command::Query(query.into()));
    }

    /// Go to the next page and refetch immediately.
    pub fn next_page(&self) {
        self.send(Command::NextPage);
    }

    /// Go to the previous page and refetch immediately. No-op on page 1.
    pub fn prev_page(&self) {
        self.send(Command::PrevPage);
    }

    /// Refetch the current query and page, e.g. after a mutation.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// The latest published view.
    #[must_use]
    pub fn view(&self) -> SearchView<T> {
        self.view.borrow().clone()
    }

    /// A receiver notified after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchView<T>> {
        self.view.clone()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Live search task has stopped");
        }
    }
}

impl<T> Drop for LiveSearch<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<T> std::fmt::Debug for LiveSearch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = self.view.borrow();
        f.debug_struct("LiveSearch")
            .field("phase", &view.phase)
            .field("query", &view.query)
            .field("page", &view.pager.page())
            .finish_non_exhaustive()
    }
}

/// In-flight request; aborted when replaced or dropped.
struct InFlight<R> {
    request: ResultsFor,
    handle: JoinHandle<R>,
}

impl<R> Drop for InFlight<R> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn wait_in_flight<R>(in_flight: &mut Option<InFlight<R>>) -> Result<R, JoinError> {
    match in_flight {
        Some(flight) => (&mut flight.handle).await,
        None => std::future::pending().await,
    }
}

type Fetched<T> = Result<ListResponse<T>, ApiError>;

/// Start a request for the current query and page.
fn issue<T, F, Fut>(
    view: &watch::Sender<SearchView<T>>,
    fetch: &F,
    in_flight: &mut Option<InFlight<Fetched<T>>>,
) where
    T: Send + 'static,
    F: Fn(String, u32) -> Fut,
    Fut: Future<Output = Fetched<T>> + Send + 'static,
{
    let (query, page) = {
        let current = view.borrow();
        (current.query.clone(), current.pager.page())
    };
    tracing::debug!(%query, page, "Issuing search request");
    // Replacing the slot drops, and so aborts, the superseded request.
    let handle = tokio::spawn(fetch(query.clone(), page));
    *in_flight = Some(InFlight {
        request: ResultsFor { query, page },
        handle,
    });
    view.send_modify(|v| {
        v.phase = SearchPhase::Fetching;
        v.requests += 1;
    });
}

async fn run<T, F, Fut>(
    mut commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<SearchView<T>>,
    fetch: F,
    debounce: Duration,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn(String, u32) -> Fut + Send + 'static,
    Fut: Future<Output = Result<ListResponse<T>, ApiError>> + Send + 'static,
{
    let mut deadline: Option<Instant> = None;
    let mut in_flight: Option<InFlight<Fetched<T>>> = None;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Query(query) => {
                        view.send_modify(|v| {
                            v.phase = SearchPhase::Typing;
                            if v.query != query {
                                v.pager.reset();
                            }
                            v.query = query;
                        });
                        deadline = Some(Instant::now() + debounce);
                        view.send_modify(|v| v.phase = SearchPhase::Debouncing);
                    }
                    Command::NextPage => {
                        let mut moved = false;
                        view.send_if_modified(|v| {
                            moved = v.pager.next();
                            moved
                        });
                        if moved {
                            deadline = None;
                            issue(&view, &fetch, &mut in_flight);
                        }
                    }
                    Command::PrevPage => {
                        let mut moved = false;
                        view.send_if_modified(|v| {
                            moved = v.pager.prev();
                            moved
                        });
                        if moved {
                            deadline = None;
                            issue(&view, &fetch, &mut in_flight);
                        }
                    }
                    Command::Refresh => {
                        deadline = None;
                        issue(&view, &fetch, &mut in_flight);
                    }
                }
            }
            () = wait_deadline(deadline) => {
                deadline = None;
                issue(&view, &fetch, &mut in_flight);
            }
            joined = wait_in_flight(&mut in_flight) => {
                let Some(request) = in_flight.take().map(|flight| flight.request.clone()) else {
                    continue;
                };
                // A newer keystroke is still settling; its request comes later.
                let debouncing = deadline.is_some();
                let settled = |done: SearchPhase| {
                    if debouncing { SearchPhase::Debouncing } else { done }
                };
                match joined {
                    Ok(Ok(response)) => view.send_modify(|v| {
                        if v.query == request.query && v.pager.page() == request.page {
                            v.pager.set_total_pages(response.total_pages);
                        }
                        v.items = response.data;
                        v.results_for = Some(request);
                        v.error = None;
                        v.phase = settled(SearchPhase::Displaying);
                    }),
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, query = %request.query, "Search request failed");
                        view.send_modify(|v| {
                            v.error = Some(err.user_message("Failed to search products"));
                            v.phase = settled(SearchPhase::ErrorDisplaying);
                        });
                    }
                    Err(err) => {
                        tracing::error!(error = %err, query = %request.query, "Search request task failed");
                        view.send_modify(|v| {
                            v.error = Some("Failed to search products".to_string());
                            v.phase = settled(SearchPhase::ErrorDisplaying);
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use super::*;

    type Log = Arc<Mutex<Vec<(String, u32)>>>;
    type FetchFuture = Pin<Box<dyn Future<Output = Fetched<String>> + Send>>;

    /// Fetcher that records every call and echoes the query back as one item.
    /// Queries starting with `slow` take five seconds, `lag` 200ms; `boom`
    /// fails.
    fn recording_fetcher(log: &Log) -> impl Fn(String, u32) -> FetchFuture + Send + 'static {
        let log = Arc::clone(log);
        move |query, page| {
            log.lock().unwrap().push((query.clone(), page));
            Box::pin(async move {
                if query.starts_with("slow") {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                } else if query.starts_with("lag") {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                if query == "boom" {
                    return Err(ApiError::Api {
                        status: 500,
                        detail: None,
                    });
                }
                Ok(ListResponse::from_items(vec![format!("{query}#{page}")]))
            })
        }
    }

    async fn settle(search: &LiveSearch<String>) -> SearchView<String> {
        let mut rx = search.subscribe();
        rx.wait_for(|v| {
            matches!(
                v.phase,
                SearchPhase::Displaying | SearchPhase::ErrorDisplaying
            )
        })
        .await
        .unwrap()
        .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_issue_one_request() {
        let log = Log::default();
        let search = LiveSearch::spawn(recording_fetcher(&log), DEFAULT_DEBOUNCE);

        search.type_query("phone");
        tokio::time::sleep(Duration::from_millis(200)).await;
        search.type_query("phones");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let view = settle(&search).await;
        assert_eq!(*log.lock().unwrap(), vec![("phones".to_string(), 1)]);
        assert_eq!(view.items, vec!["phones#1".to_string()]);
        assert_eq!(view.requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncing_before_timer_fires() {
        let log = Log::default();
        let search = LiveSearch::spawn(recording_fetcher(&log), DEFAULT_DEBOUNCE);

        search.type_query("p");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(search.view().phase, SearchPhase::Debouncing);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_request_supersedes_slow_one() {
        let log = Log::default();
        let search = LiveSearch::spawn(recording_fetcher(&log), DEFAULT_DEBOUNCE);

        search.type_query("slow phone");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(search.view().phase, SearchPhase::Fetching);

        search.type_query("phones");
        tokio::time::sleep(Duration::from_secs(10)).await;

        let view = settle(&search).await;
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(view.items, vec!["phones#1".to_string()]);
        assert_eq!(view.query, "phones");
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_landing_mid_debounce_is_labelled_with_its_query() {
        let log = Log::default();
        let search = LiveSearch::spawn(recording_fetcher(&log), DEFAULT_DEBOUNCE);

        search.type_query("lag phone");
        tokio::time::sleep(Duration::from_millis(350)).await;
        search.type_query("lag phones");
        tokio::time::sleep(Duration::from_millis(200)).await;

        let view = search.view();
        assert_eq!(view.phase, SearchPhase::Debouncing);
        assert_eq!(view.query, "lag phones");
        assert_eq!(view.items, vec!["lag phone#1".to_string()]);
        assert_eq!(
            view.results_for,
            Some(ResultsFor {
                query: "lag phone".to_string(),
                page: 1,
            })
        );
        assert!(!view.is_current());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let view = settle(&search).await;
        assert_eq!(view.phase, SearchPhase::Displaying);
        assert_eq!(view.items, vec!["lag phones#1".to_string()]);
        assert_eq!(view.results_for.as_ref().map(|r| r.query.as_str()), Some("lag phones"));
        assert!(view.is_current());
        assert_eq!(view.requests, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_previous_list() {
        let log = Log::default();
        let search = LiveSearch::spawn(recording_fetcher(&log), DEFAULT_DEBOUNCE);

        search.type_query("phone");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(settle(&search).await.items, vec!["phone#1".to_string()]);

        search.type_query("boom");
        tokio::time::sleep(Duration::from_millis(400)).await;

        let view = settle(&search).await;
        assert_eq!(view.phase, SearchPhase::ErrorDisplaying);
        assert_eq!(view.error.as_deref(), Some("Failed to search products"));
        assert_eq!(view.items, vec!["phone#1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_fetches_immediately_and_new_query_resets_page() {
        let log = Log::default();
        let search = LiveSearch::spawn(recording_fetcher(&log), DEFAULT_DEBOUNCE);

        search.type_query("case");
        tokio::time::sleep(Duration::from_millis(400)).await;
        search.prev_page();
        search.next_page();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(settle(&search).await.items, vec!["case#2".to_string()]);

        search.type_query("cases");
        tokio::time::sleep(Duration::from_millis(400)).await;

        let view = settle(&search).await;
        assert_eq!(view.pager.page(), 1);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("case".to_string(), 1),
                ("case".to_string(), 2),
                ("cases".to_string(), 1),
            ]
        );
    }
}
