use crate::error::{DishbrainError, Result};
use crate::source::{ExpertSource, StaticSource};
use crate::types::Expert;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub source: String,
    pub total_experts: usize,
    pub institutions: BTreeSet<String>,
    pub expertise_tags: BTreeSet<String>,
    pub loaded_at: DateTime<Utc>,
    pub load_duration_ms: u64,
    /// Set when the one-time load failed and the repository fell back to an
    /// empty roster.
    pub degraded: bool,
    pub last_error: Option<String>,
}

/// Counters that keep moving after the load, unlike [`RepositoryMetadata`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub source_loads: u64,
    pub chunk_requests: u64,
}

#[derive(Debug)]
struct LoadedCorpus {
    experts: Arc<Vec<Expert>>,
    id_index: HashMap<String, usize>,
    metadata: RepositoryMetadata,
}

/// Read-only roster of experts, loaded once from its source and memoized.
///
/// The first accessor performs the load; every later call, including ones
/// racing the first, observes the same `Arc` of records. A failed load is
/// logged and replaced by an empty roster for the rest of the session.
pub struct ExpertRepository {
    source: Arc<dyn ExpertSource>,
    corpus: OnceCell<LoadedCorpus>,
    source_loads: AtomicU64,
    chunk_requests: AtomicU64,
}

impl std::fmt::Debug for ExpertRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpertRepository")
            .field("source", &self.source.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ExpertRepository {
    pub fn new(source: Arc<dyn ExpertSource>) -> Self {
        Self {
            source,
            corpus: OnceCell::new(),
            source_loads: AtomicU64::new(0),
            chunk_requests: AtomicU64::new(0),
        }
    }

    pub fn from_experts(experts: Vec<Expert>) -> Self {
        Self::new(Arc::new(StaticSource::new(experts)))
    }

    pub fn is_loaded(&self) -> bool {
        self.corpus.initialized()
    }

    /// Get all experts in source order
    pub async fn get_all(&self) -> Arc<Vec<Expert>> {
        self.corpus().await.experts.clone()
    }

    /// Get up to `limit` experts starting at `offset`.
    ///
    /// Returns an empty chunk when `offset` is past the end. A zero `limit`
    /// is a caller bug and is rejected.
    pub async fn get_chunk(&self, offset: usize, limit: usize) -> Result<Vec<Expert>> {
        if limit == 0 {
            return Err(DishbrainError::InvalidArgument(
                "chunk limit must be greater than zero".to_string(),
            ));
        }

        self.chunk_requests.fetch_add(1, Ordering::Relaxed);
        let experts = &self.corpus().await.experts;

        if offset >= experts.len() {
            debug!(offset, total = experts.len(), "Chunk requested past end of roster");
            return Ok(Vec::new());
        }

        let end = offset.saturating_add(limit).min(experts.len());
        debug!(offset, limit, returned = end - offset, "Serving expert chunk");
        Ok(experts[offset..end].to_vec())
    }

    /// Get an expert by id
    pub async fn get(&self, id: &str) -> Option<Expert> {
        let corpus = self.corpus().await;
        corpus
            .id_index
            .get(id)
            .and_then(|&index| corpus.experts.get(index))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.corpus().await.experts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get repository metadata, loading the roster if needed
    pub async fn metadata(&self) -> RepositoryMetadata {
        self.corpus().await.metadata.clone()
    }

    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            source_loads: self.source_loads.load(Ordering::Relaxed),
            chunk_requests: self.chunk_requests.load(Ordering::Relaxed),
        }
    }

    // Private helper methods

    async fn corpus(&self) -> &LoadedCorpus {
        self.corpus.get_or_init(|| self.load()).await
    }

    async fn load(&self) -> LoadedCorpus {
        let start_time = Instant::now();
        let source = self.source.describe();
        self.source_loads.fetch_add(1, Ordering::Relaxed);

        let loaded = match self.source.fetch_all().await {
            Ok(experts) => index_experts(&experts).map(|id_index| (experts, id_index)),
            Err(e) => Err(e),
        };
        let duration = start_time.elapsed().as_millis() as u64;

        match loaded {
            Ok((experts, id_index)) => {
                info!(source = %source, count = experts.len(), duration_ms = duration, "Loaded expert roster");
                let metadata = build_metadata(&source, &experts, duration, None);
                LoadedCorpus {
                    experts: Arc::new(experts),
                    id_index,
                    metadata,
                }
            }
            Err(e) => {
                error!(source = %source, error = %e, "Failed to load expert roster, continuing with an empty one");
                let metadata = build_metadata(&source, &[], duration, Some(e.to_string()));
                LoadedCorpus {
                    experts: Arc::new(Vec::new()),
                    id_index: HashMap::new(),
                    metadata,
                }
            }
        }
    }
}

/// Build the id index, rejecting rosters with blank or repeated ids.
fn index_experts(experts: &[Expert]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(experts.len());
    for (position, expert) in experts.iter().enumerate() {
        if expert.id.trim().is_empty() {
            return Err(DishbrainError::LoadFailure(format!(
                "expert at position {} ({}) has no id",
                position,
                expert.full_name()
            )));
        }
        if let Some(previous) = index.insert(expert.id.clone(), position) {
            return Err(DishbrainError::LoadFailure(format!(
                "duplicate expert id '{}' at positions {} and {}",
                expert.id, previous, position
            )));
        }
    }
    Ok(index)
}

fn build_metadata(source: &str, experts: &[Expert], load_duration_ms: u64, error: Option<String>) -> RepositoryMetadata {
    RepositoryMetadata {
        source: source.to_string(),
        total_experts: experts.len(),
        institutions: experts.iter().map(|e| e.institution_name().to_string()).collect(),
        expertise_tags: experts
            .iter()
            .flat_map(|e| e.primary_expertise().iter().cloned())
            .collect(),
        loaded_at: Utc::now(),
        load_duration_ms,
        degraded: error.is_some(),
        last_error: error,
    }
}
