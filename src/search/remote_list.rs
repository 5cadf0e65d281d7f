//! Paginated remote list shared by every listing-style view.
//!
//! A [`RemoteList`] owns one query, issues a request whenever it changes and
//! publishes a [`ListView`] through a `watch` channel. Requests may overlap;
//! each carries a sequence number and only the most recently issued one is
//! allowed to touch the view.

use crate::error::ApiError;
use crate::search::page::{total_pages, ListResponse, ResultPage};
use crate::search::traits::{ListQuery, ListSource, QueryParams};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub loading: bool,
    /// A debounced request is waiting for its quiet period to pass
    pub pending: bool,
    /// User-facing message for the latest failed request
    pub error: Option<String>,
    /// Last successfully loaded page; kept while reloading and after failures
    pub result: Option<ResultPage<T>>,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            loading: false,
            pending: false,
            error: None,
            result: None,
        }
    }
}

impl<T> ListView<T> {
    pub fn total_pages(&self) -> u32 {
        self.result.as_ref().map_or(0, |r| r.total_pages)
    }

    /// Loaded successfully with nothing to show
    pub fn is_empty(&self) -> bool {
        self.result.as_ref().is_some_and(ResultPage::is_empty)
    }
}

/// How a query change turns into a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Request right away
    Immediate,
    /// Request once the query has been left alone for the debounce period
    Debounced,
}

/// Query with a page number and a fixed set of extra parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    page: u32,
    fixed: QueryParams,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PageQuery {
    pub fn new() -> Self {
        Self {
            page: 1,
            fixed: QueryParams::new(),
        }
    }

    pub fn with_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fixed.push((name, value.into()));
        self
    }
}

impl ListQuery for PageQuery {
    fn page(&self) -> u32 {
        self.page
    }

    fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    fn to_params(&self, page_size: u32) -> QueryParams {
        let mut params = self.fixed.clone();
        params.push(("page", self.page.to_string()));
        params.push(("page_size", page_size.to_string()));
        params
    }
}

struct State<Q> {
    query: Q,
    /// Sequence number of the latest issued request
    issued: u64,
    /// Bumped on every query change; a debounce timer fires only if unchanged
    generation: u64,
}

struct Shared<T: Send, Q> {
    source: Arc<dyn ListSource<T>>,
    state: Mutex<State<Q>>,
    view: watch::Sender<ListView<T>>,
    query_tx: watch::Sender<Q>,
    page_size: u32,
    debounce: Duration,
}

/// Remote, paginated, last-write-wins list of `T` driven by query `Q`.
///
/// Must be used from within a tokio runtime; requests run as spawned tasks.
pub struct RemoteList<T: Send, Q> {
    shared: Arc<Shared<T, Q>>,
}

impl<T: Send, Q> Clone for RemoteList<T, Q> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, Q> RemoteList<T, Q>
where
    T: Send + Sync + 'static,
    Q: ListQuery,
{
    /// Create the list without fetching; call [`RemoteList::refresh`] to load
    pub fn new(
        source: Arc<dyn ListSource<T>>,
        query: Q,
        page_size: u32,
        debounce: Duration,
    ) -> Self {
        let (view, _) = watch::channel(ListView::default());
        let (query_tx, _) = watch::channel(query.clone());
        Self {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(State {
                    query,
                    issued: 0,
                    generation: 0,
                }),
                view,
                query_tx,
                page_size: page_size.max(1),
                debounce,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView<T>> {
        self.shared.view.subscribe()
    }

    /// Every committed query, for callers that mirror it elsewhere (the URL)
    pub fn watch_query(&self) -> watch::Receiver<Q> {
        self.shared.query_tx.subscribe()
    }

    pub fn query(&self) -> Q {
        self.shared.lock().query.clone()
    }

    pub fn page_size(&self) -> u32 {
        self.shared.page_size
    }

    /// Total records behind the page on display, if one has loaded
    pub fn total_count(&self) -> Option<u64> {
        self.shared.view.borrow().result.as_ref().map(|r| r.total_count)
    }

    /// Re-issue the request for the current query
    pub fn refresh(&self) {
        let mut state = self.shared.lock();
        state.generation += 1;
        Shared::start_fetch(&self.shared, &mut state);
    }

    /// Change the query and schedule a request according to `dispatch`.
    ///
    /// An immediate request also cancels any pending debounced one, since it
    /// is built from the same, newer query.
    pub fn update(&self, change: impl FnOnce(&mut Q), dispatch: Dispatch) {
        let mut state = self.shared.lock();
        change(&mut state.query);
        state.generation += 1;
        self.shared.query_tx.send_replace(state.query.clone());

        match dispatch {
            Dispatch::Immediate => Shared::start_fetch(&self.shared, &mut state),
            Dispatch::Debounced => {
                self.shared.view.send_modify(|view| view.pending = true);
                let generation = state.generation;
                let shared = Arc::clone(&self.shared);
                tokio::spawn(async move {
                    tokio::time::sleep(shared.debounce).await;
                    let mut state = shared.lock();
                    if state.generation == generation {
                        Shared::start_fetch(&shared, &mut state);
                    }
                });
            }
        }
    }

    /// Go to page `n`, clamped to `1..=max(1, total_pages)` of the page on display
    pub fn set_page(&self, n: u32) {
        let last = self.shared.view.borrow().total_pages().max(1);
        let page = n.clamp(1, last);
        if page != n {
            debug!(requested = n, page, "Clamped page request");
        }
        self.update(|q| q.set_page(page), Dispatch::Immediate);
    }

    /// Drop loaded items that fail `keep`, adjusting the count to match
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) {
        self.shared.view.send_modify(|view| {
            if let Some(result) = view.result.as_mut() {
                let before = result.items.len();
                result.items.retain(|item| keep(item));
                let removed = (before - result.items.len()) as u64;
                result.total_count = result.total_count.saturating_sub(removed);
                result.total_pages = total_pages(result.total_count, result.page_size);
            }
        });
    }

    /// Wait until no request is in flight or scheduled and return the view
    /// at that point
    pub async fn settled(&self) -> ListView<T>
    where
        T: Clone,
    {
        let mut rx = self.subscribe();
        let view = match rx.wait_for(|view| !view.loading && !view.pending).await {
            Ok(view) => view.clone(),
            Err(_) => self.snapshot(),
        };
        view
    }

    pub fn snapshot(&self) -> ListView<T>
    where
        T: Clone,
    {
        self.shared.view.borrow().clone()
    }
}

impl<T, Q> Shared<T, Q>
where
    T: Send + Sync + 'static,
    Q: ListQuery,
{
    fn lock(&self) -> MutexGuard<'_, State<Q>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_fetch(this: &Arc<Self>, state: &mut State<Q>) {
        state.issued += 1;
        let seq = state.issued;
        let page = state.query.page();
        let params = state.query.to_params(this.page_size);

        debug!(
            source = this.source.source_name(),
            seq,
            ?params,
            "Fetching page"
        );
        this.view.send_modify(|view| {
            view.loading = true;
            view.pending = false;
        });

        let shared = Arc::clone(this);
        tokio::spawn(async move {
            let outcome = shared.source.fetch(&params).await;
            shared.complete(seq, page, outcome);
        });
    }

    fn complete(&self, seq: u64, page: u32, outcome: Result<ListResponse<T>, ApiError>) {
        let state = self.lock();
        if seq != state.issued {
            debug!(
                source = self.source.source_name(),
                seq,
                latest = state.issued,
                ok = outcome.is_ok(),
                "Discarding superseded response"
            );
            return;
        }

        match outcome {
            Ok(response) => {
                let result = ResultPage::from_response(response, page, self.page_size);
                debug!(
                    source = self.source.source_name(),
                    seq,
                    items = result.items.len(),
                    total = result.total_count,
                    "Page loaded"
                );
                self.view.send_modify(|view| {
                    view.loading = false;
                    view.error = None;
                    view.result = Some(result);
                });
            }
            Err(e) => {
                warn!(
                    source = self.source.source_name(),
                    seq,
                    cause = e.cause(),
                    "Fetch failed: {}",
                    e
                );
                self.view.send_modify(|view| {
                    view.loading = false;
                    view.error = Some(e.user_message());
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Answers each request with `count` numbers starting at `page * 100`
    struct Numbers {
        count: u64,
        requests: Mutex<Vec<QueryParams>>,
    }

    #[async_trait]
    impl ListSource<u64> for Numbers {
        async fn fetch(&self, params: &QueryParams) -> Result<ListResponse<u64>, ApiError> {
            self.requests.lock().unwrap().push(params.clone());
            let page: u64 = params
                .iter()
                .find(|(n, _)| *n == "page")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(1);
            Ok(ListResponse::Paged {
                results: (0..3).map(|i| page * 100 + i).collect(),
                count: Some(self.count),
            })
        }

        fn source_name(&self) -> &'static str {
            "numbers"
        }
    }

    fn list(count: u64) -> (Arc<Numbers>, RemoteList<u64, PageQuery>) {
        let source = Arc::new(Numbers {
            count,
            requests: Mutex::new(Vec::new()),
        });
        let list = RemoteList::new(
            source.clone(),
            PageQuery::new().with_param("owner_only", "true"),
            12,
            Duration::from_millis(400),
        );
        (source, list)
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_publishes_loaded_page() {
        let (source, list) = list(30);
        list.refresh();
        assert!(list.snapshot().loading);

        let view = list.settled().await;
        assert!(!view.loading);
        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.result.unwrap().items, vec![100, 101, 102]);

        let sent = source.requests.lock().unwrap()[0].clone();
        assert_eq!(
            sent,
            vec![
                ("owner_only", "true".to_string()),
                ("page", "1".to_string()),
                ("page_size", "12".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn set_page_before_any_result_stays_on_first_page() {
        let (_source, list) = list(30);
        list.set_page(5);
        assert_eq!(list.query().page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retain_updates_counts() {
        let (_source, list) = list(13);
        list.refresh();
        list.settled().await;

        list.retain(|n| *n != 101);
        let result = list.snapshot().result.unwrap();
        assert_eq!(result.items, vec![100, 102]);
        assert_eq!(result.total_count, 12);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_update_waits_for_quiet_period() {
        let (source, list) = list(3);
        list.update(|q| q.set_page(1), Dispatch::Debounced);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(source.requests.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(source.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_debounce_counts_as_unsettled() {
        let (source, list) = list(3);
        list.update(|q| q.set_page(1), Dispatch::Debounced);
        let view = list.snapshot();
        assert!(view.pending);
        assert!(!view.loading);

        let view = list.settled().await;
        assert!(!view.pending);
        assert!(view.result.is_some());
        assert_eq!(source.requests.lock().unwrap().len(), 1);
    }
}
