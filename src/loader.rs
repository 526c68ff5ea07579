//! Incremental browse loading.
//!
//! The browse list starts with one chunk and grows by a page each time the
//! view asks for more. Overlapping requests are coalesced into the one
//! already running, and every failure is logged and treated as "no items".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::ExpertRepository;
use crate::types::Expert;

pub const DEFAULT_INITIAL_CHUNK: usize = 20;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCursor {
    pub loaded_count: usize,
    pub has_more: bool,
}

impl Default for LoadCursor {
    fn default() -> Self {
        Self {
            loaded_count: 0,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedPage {
    pub items: Vec<Expert>,
    pub has_more: bool,
}

#[derive(Debug, Default)]
struct BrowseState {
    items: Vec<Expert>,
    cursor: LoadCursor,
}

/// Clears the in-flight flag when a load finishes or its future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct IncrementalLoader {
    repository: Arc<ExpertRepository>,
    page_size: usize,
    state: Mutex<BrowseState>,
    in_flight: AtomicBool,
}

impl IncrementalLoader {
    pub fn new(repository: Arc<ExpertRepository>) -> Self {
        Self::with_page_size(repository, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(repository: Arc<ExpertRepository>, page_size: usize) -> Self {
        Self {
            repository,
            page_size,
            state: Mutex::new(BrowseState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Load the first `chunk_size` experts, replacing whatever was loaded before.
    pub async fn load_initial(&self, chunk_size: usize) -> LoadedPage {
        let page = match self.repository.get_chunk(0, chunk_size).await {
            Ok(items) => {
                let total = self.repository.len().await;
                let has_more = items.len() < total;
                LoadedPage { items, has_more }
            }
            Err(e) => {
                warn!(error = %e, chunk_size, "Initial expert load failed");
                LoadedPage {
                    items: Vec::new(),
                    has_more: false,
                }
            }
        };

        let mut state = self.state.lock();
        state.items = page.items.clone();
        state.cursor = LoadCursor {
            loaded_count: page.items.len(),
            has_more: page.has_more,
        };
        debug!(loaded = state.cursor.loaded_count, has_more = page.has_more, "Initial chunk loaded");

        page
    }

    /// Load the next configured page.
    pub async fn load_next_page(&self) -> Vec<Expert> {
        self.load_more(self.page_size).await
    }

    /// Load up to `limit` experts after the ones already loaded.
    ///
    /// No-op (returns nothing) while another call is in flight or once the
    /// roster is exhausted. A page shorter than `limit` marks the end.
    pub async fn load_more(&self, limit: usize) -> Vec<Expert> {
        if !self.state.lock().cursor.has_more {
            debug!("Roster exhausted, ignoring load more");
            return Vec::new();
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Load more already in flight, coalescing");
            return Vec::new();
        }
        let _guard = InFlightGuard(&self.in_flight);

        let offset = self.state.lock().cursor.loaded_count;
        let items = match self.repository.get_chunk(offset, limit).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, offset, limit, "Load more failed");
                Vec::new()
            }
        };
        let total = self.repository.len().await;

        let mut state = self.state.lock();
        state.items.extend(items.iter().cloned());
        state.cursor.loaded_count += items.len();
        if items.len() < limit || state.cursor.loaded_count >= total {
            state.cursor.has_more = false;
        }
        debug!(
            fetched = items.len(),
            loaded = state.cursor.loaded_count,
            has_more = state.cursor.has_more,
            "Loaded more experts"
        );

        items
    }

    pub fn cursor(&self) -> LoadCursor {
        self.state.lock().cursor
    }

    pub fn has_more(&self) -> bool {
        self.cursor().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the browse list loaded so far.
    pub fn loaded(&self) -> Vec<Expert> {
        self.state.lock().items.clone()
    }

    pub fn loaded_count(&self) -> usize {
        self.cursor().loaded_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::source::ExpertSource;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use tokio::sync::Notify;

    fn create_test_experts(count: usize) -> Vec<Expert> {
        (0..count)
            .map(|i| Expert::new(format!("exp{}", i), format!("Expert {}", i), "Test Institute"))
            .collect()
    }

    fn create_loader(count: usize) -> (Arc<ExpertRepository>, IncrementalLoader) {
        let repository = Arc::new(ExpertRepository::from_experts(create_test_experts(count)));
        let loader = IncrementalLoader::new(repository.clone());
        (repository, loader)
    }

    /// Source that blocks until released, to hold a load in flight.
    struct GatedSource {
        gate: Arc<Notify>,
        experts: Vec<Expert>,
    }

    #[async_trait]
    impl ExpertSource for GatedSource {
        async fn fetch_all(&self) -> Result<Vec<Expert>> {
            self.gate.notified().await;
            Ok(self.experts.clone())
        }

        fn describe(&self) -> String {
            "gated source".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_initial_partial() {
        let (_, loader) = create_loader(25);
        let page = loader.load_initial(20).await;

        assert_eq!(page.items.len(), 20);
        assert!(page.has_more);
        assert_eq!(loader.cursor(), LoadCursor { loaded_count: 20, has_more: true });
    }

    #[tokio::test]
    async fn test_loader_exhaustion() {
        let (repository, loader) = create_loader(7);
        let page = loader.load_initial(20).await;

        assert_eq!(page.items.len(), 7);
        assert!(!page.has_more);

        let requests_before = repository.stats().chunk_requests;
        let more = loader.load_more(10).await;
        assert!(more.is_empty());
        assert_eq!(repository.stats().chunk_requests, requests_before);
        assert_eq!(loader.loaded_count(), 7);
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let (_, loader) = create_loader(25);
        loader.load_initial(20).await;

        let more = loader.load_next_page().await;
        assert_eq!(more.len(), 5);
        assert_eq!(more[0].id, "exp20");
        assert!(!loader.has_more());

        let loaded = loader.loaded();
        assert_eq!(loaded.len(), 25);
        assert_eq!(loaded[24].id, "exp24");
    }

    #[tokio::test]
    async fn test_exact_page_boundary_needs_no_extra_fetch() {
        let (repository, loader) = create_loader(20);
        loader.load_initial(10).await;
        assert!(loader.has_more());

        assert_eq!(loader.load_more(10).await.len(), 10);
        assert!(!loader.has_more());

        let requests = repository.stats().chunk_requests;
        assert!(loader.load_more(10).await.is_empty());
        assert_eq!(repository.stats().chunk_requests, requests);
    }

    #[tokio::test]
    async fn test_load_more_without_initial_starts_at_zero() {
        let (_, loader) = create_loader(3);
        let items = loader.load_more(2).await;
        assert_eq!(items[0].id, "exp0");
        assert_eq!(loader.cursor(), LoadCursor { loaded_count: 2, has_more: true });
    }

    #[tokio::test]
    async fn test_zero_limit_fails_soft() {
        let (_, loader) = create_loader(3);
        let page = loader.load_initial(0).await;
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert!(!loader.is_loading());
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let (_, loader) = create_loader(0);
        let page = loader.load_initial(20).await;
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_in_flight_guard_coalesces_overlapping_calls() {
        let gate = Arc::new(Notify::new());
        let source = GatedSource {
            gate: gate.clone(),
            experts: create_test_experts(12),
        };
        let repository = Arc::new(ExpertRepository::new(Arc::new(source)));
        let loader = IncrementalLoader::new(repository.clone());

        let (first, second) = tokio::join!(loader.load_more(5), async {
            let overlapping = loader.load_more(5).await;
            gate.notify_one();
            overlapping
        });

        assert_eq!(first.len(), 5);
        assert!(second.is_empty());
        assert_eq!(repository.stats().chunk_requests, 1);
        assert_eq!(loader.loaded_count(), 5);
        assert!(!loader.is_loading());
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_roster_exactly_once(
            total in 0usize..40,
            chunk_size in 1usize..15,
            page_size in 1usize..15,
        ) {
            let experts = create_test_experts(total);
            let repository = Arc::new(ExpertRepository::from_experts(experts.clone()));
            let loader = IncrementalLoader::with_page_size(repository, page_size);

            let collected = tokio_test::block_on(async {
                let page = loader.load_initial(chunk_size).await;
                let mut collected = page.items;
                let mut has_more = page.has_more;
                while has_more {
                    collected.extend(loader.load_next_page().await);
                    has_more = loader.has_more();
                }
                collected
            });

            prop_assert_eq!(collected, experts);
        }
    }
}
