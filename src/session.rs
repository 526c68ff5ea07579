//! Per-view state: everything that lives from mount to unmount.
//!
//! A session owns the browse loader, the filter state, the debounced search
//! and its accepted results, and the presenter. The repository is shared
//! between sessions; nothing else is.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::DishbrainConfig;
use crate::loader::{IncrementalLoader, LoadedPage, DEFAULT_INITIAL_CHUNK, DEFAULT_PAGE_SIZE};
use crate::presentation::{Frame, ListMode, LoadMoreTrigger, ResultPresenter, ScrollMetrics, VirtualWindow};
use crate::search::debounce::DEFAULT_DEBOUNCE;
use crate::search::{self, LatestSlot, QueryDebouncer, SearchTicket};
use crate::storage::ExpertRepository;
use crate::types::{Expert, FilterState};

pub type SearchResults = Arc<Vec<Expert>>;

/// Builder for [`ExpertSession`].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    repository: Arc<ExpertRepository>,
    initial_chunk: usize,
    page_size: usize,
    debounce: Duration,
    presenter: ResultPresenter,
}

impl SessionBuilder {
    pub fn new(repository: Arc<ExpertRepository>) -> Self {
        Self {
            repository,
            initial_chunk: DEFAULT_INITIAL_CHUNK,
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            presenter: ResultPresenter::default(),
        }
    }

    pub fn initial_chunk(mut self, initial_chunk: usize) -> Self {
        self.initial_chunk = initial_chunk;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn presenter(mut self, presenter: ResultPresenter) -> Self {
        self.presenter = presenter;
        self
    }

    /// Take loader, search and presentation settings from `config`.
    pub fn with_config(self, config: &DishbrainConfig) -> Self {
        let presenter = ResultPresenter::new(
            VirtualWindow::new(config.presentation.item_height, config.presentation.overscan),
            LoadMoreTrigger::new(config.presentation.load_more_threshold),
        );
        self.initial_chunk(config.loader.initial_chunk)
            .page_size(config.loader.page_size)
            .debounce(config.search.debounce())
            .presenter(presenter)
    }

    pub fn build(self) -> ExpertSession {
        ExpertSession {
            loader: IncrementalLoader::with_page_size(self.repository.clone(), self.page_size),
            repository: self.repository,
            initial_chunk: self.initial_chunk,
            query: Mutex::new(String::new()),
            filters: Mutex::new(FilterState::default()),
            debouncer: QueryDebouncer::new(self.debounce),
            results: LatestSlot::new(),
            presenter: self.presenter,
        }
    }
}

pub struct ExpertSession {
    repository: Arc<ExpertRepository>,
    loader: IncrementalLoader,
    initial_chunk: usize,
    query: Mutex<String>,
    filters: Mutex<FilterState>,
    debouncer: QueryDebouncer,
    results: LatestSlot<SearchResults>,
    presenter: ResultPresenter,
}

impl ExpertSession {
    pub fn builder(repository: Arc<ExpertRepository>) -> SessionBuilder {
        SessionBuilder::new(repository)
    }

    pub fn new(repository: Arc<ExpertRepository>) -> Self {
        SessionBuilder::new(repository).build()
    }

    pub fn repository(&self) -> &Arc<ExpertRepository> {
        &self.repository
    }

    pub fn loader(&self) -> &IncrementalLoader {
        &self.loader
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    /// Load the first browse chunk.
    pub async fn mount(&self) -> LoadedPage {
        let page = self.loader.load_initial(self.initial_chunk).await;
        info!(loaded = page.items.len(), has_more = page.has_more, "Session mounted");
        page
    }

    pub fn query(&self) -> String {
        self.query.lock().clone()
    }

    pub fn filters(&self) -> FilterState {
        self.filters.lock().clone()
    }

    /// Search mode while a query or any facet is set.
    pub fn mode(&self) -> ListMode {
        if self.query.lock().is_empty() && self.filters.lock().is_default() {
            ListMode::Browse
        } else {
            ListMode::Search
        }
    }

    /// Submit a new query through the debounce window.
    ///
    /// Returns the results only when this submission ended up being the one
    /// that ran and was still the latest when it finished.
    pub async fn set_query(&self, query: impl Into<String>) -> Option<SearchResults> {
        let query = query.into();
        *self.query.lock() = query.clone();
        let filters = self.filters();
        let repository = self.repository.clone();

        let (ticket, results) = self
            .debouncer
            .run(|ticket| async move { (ticket, run_search(&repository, &query, &filters).await) })
            .await?;

        self.accept(ticket, results)
    }

    /// Apply new facet filters immediately, superseding any pending query.
    pub async fn apply_filters(&self, filters: FilterState) -> Option<SearchResults> {
        *self.filters.lock() = filters.clone();
        let query = self.query();
        let ticket = self.debouncer.issue();

        let results = run_search(&self.repository, &query, &filters).await;
        self.accept(ticket, results)
    }

    /// Back to the browse list. Pending searches are superseded.
    pub fn clear_search(&self) {
        self.query.lock().clear();
        *self.filters.lock() = FilterState::default();
        self.debouncer.issue();
        self.results.clear();
        debug!("Search cleared");
    }

    /// Latest accepted search results, if any.
    pub fn search_results(&self) -> Option<SearchResults> {
        self.results.current()
    }

    /// The list currently on screen: search results in search mode, the
    /// loaded browse list otherwise.
    pub fn current_items(&self) -> Vec<Expert> {
        match self.mode() {
            ListMode::Browse => self.loader.loaded(),
            ListMode::Search => self
                .results
                .current()
                .map(|results| results.as_ref().clone())
                .unwrap_or_default(),
        }
    }

    /// Length of the list on screen, without copying it.
    pub fn current_len(&self) -> usize {
        match self.mode() {
            ListMode::Browse => self.loader.loaded_count(),
            ListMode::Search => self.results.current().map_or(0, |results| results.len()),
        }
    }

    pub fn frame(&self, metrics: &ScrollMetrics) -> Frame {
        let count = self.current_len();
        self.presenter.frame(self.mode(), count, metrics, self.loader.has_more())
    }

    /// React to a scroll position, loading the next browse page when the
    /// trigger fires.
    pub async fn on_scroll(&self, metrics: &ScrollMetrics) -> Frame {
        let frame = self.frame(metrics);
        if frame.load_more {
            let loaded = self.loader.load_next_page().await;
            debug!(loaded = loaded.len(), "Scroll triggered load more");
        }
        frame
    }

    /// Materialized items for a scroll position.
    pub fn visible_items(&self, metrics: &ScrollMetrics) -> Vec<Expert> {
        let items = self.current_items();
        let range = self
            .presenter
            .window()
            .visible_range(items.len(), metrics.scroll_top, metrics.client_height);
        items[range].to_vec()
    }

    fn accept(&self, ticket: SearchTicket, results: SearchResults) -> Option<SearchResults> {
        if self.results.publish(&self.debouncer, ticket, results.clone()) {
            debug!(sequence = ticket.sequence(), count = results.len(), "Search results accepted");
            Some(results)
        } else {
            debug!(sequence = ticket.sequence(), "Search results superseded");
            None
        }
    }
}

async fn run_search(repository: &ExpertRepository, query: &str, filters: &FilterState) -> SearchResults {
    let corpus = repository.get_all().await;
    let outcome = search::search_with_stats(query, filters, &corpus);
    debug!(
        query,
        matches = outcome.total_matches,
        duration_ms = outcome.query_duration_ms,
        "Search executed"
    );
    Arc::new(outcome.items.into_iter().cloned().collect())
}
