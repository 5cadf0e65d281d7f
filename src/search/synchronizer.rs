use crate::config::ClientConfig;
use crate::models::PropertyRecord;
use crate::search::filter::{FilterState, FilterUpdate};
use crate::search::remote_list::{Dispatch, ListView, RemoteList};
use crate::search::traits::ListSource;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Keeps the property search results in step with the filter state.
///
/// Text typed into the search box is debounced; every other change is sent
/// at once. Only the most recently issued request may update the view.
#[derive(Clone)]
pub struct PropertySearch {
    list: RemoteList<PropertyRecord, FilterState>,
}

impl PropertySearch {
    /// Enter the listing view with `initial` filters and start the first fetch
    pub fn open(
        source: Arc<dyn ListSource<PropertyRecord>>,
        initial: FilterState,
        config: &ClientConfig,
    ) -> Self {
        info!(
            "Opening property search from {} ({})",
            source.source_name(),
            if initial.is_unfiltered() { "unfiltered" } else { "filtered" }
        );
        let list = RemoteList::new(source, initial, config.page_size, config.debounce);
        list.refresh();
        Self { list }
    }

    /// Enter the listing view seeded from the current URL's query string
    pub fn from_query_string(
        source: Arc<dyn ListSource<PropertyRecord>>,
        query: &str,
        config: &ClientConfig,
    ) -> Self {
        Self::open(source, FilterState::from_query_string(query), config)
    }

    /// Replace one field. Anything but the page resets to page 1.
    pub fn set_filter(&self, update: FilterUpdate) {
        match update {
            FilterUpdate::Page(n) => self.set_page(n),
            update => {
                let dispatch = if update.is_search() {
                    Dispatch::Debounced
                } else {
                    Dispatch::Immediate
                };
                self.list.update(|filter| filter.apply(update), dispatch);
            }
        }
    }

    /// Go to page `n`, clamped to the pages of the result on display
    pub fn set_page(&self, n: u32) {
        self.list.set_page(n);
    }

    /// Reset every field to its default and fetch
    pub fn clear_all(&self) {
        self.list
            .update(|filter| *filter = FilterState::default(), Dispatch::Immediate);
    }

    /// Re-issue the current query, e.g. after a failure
    pub fn retry(&self) {
        self.list.refresh();
    }

    pub fn filter(&self) -> FilterState {
        self.list.query()
    }

    /// Committed filter states, for reflecting into the address bar
    pub fn watch_filter(&self) -> watch::Receiver<FilterState> {
        self.list.watch_query()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView<PropertyRecord>> {
        self.list.subscribe()
    }

    pub fn snapshot(&self) -> ListView<PropertyRecord> {
        self.list.snapshot()
    }

    pub async fn settled(&self) -> ListView<PropertyRecord> {
        self.list.settled().await
    }
}
