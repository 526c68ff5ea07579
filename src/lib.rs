//! # Dishbrain
//!
//! Core of the Dishbrain AI expert directory: an in-memory roster of experts
//! loaded once from a source, incremental browse loading, free-text search
//! with facet filters behind a debounce, and pure windowing for long result
//! lists.
//!
//! ```no_run
//! use std::sync::Arc;
//! use dishbrain::{ExpertRepository, ExpertSession, ScrollMetrics};
//! use dishbrain::source::BundledSource;
//!
//! # async fn example() {
//! let repository = Arc::new(ExpertRepository::new(Arc::new(BundledSource)));
//! let session = ExpertSession::new(repository);
//!
//! let page = session.mount().await;
//! println!("{} experts, more: {}", page.items.len(), page.has_more);
//!
//! if let Some(results) = session.set_query("learning").await {
//!     println!("{} matches", results.len());
//! }
//!
//! let frame = session.on_scroll(&ScrollMetrics::new(0.0, 4000.0, 600.0)).await;
//! println!("render {:?}", frame.range);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod lookup;
pub mod presentation;
pub mod search;
pub mod session;
pub mod source;
pub mod storage;
pub mod types;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cli_types;
#[cfg(feature = "cli")]
pub mod ui;

// Re-export commonly used types
pub use config::DishbrainConfig;
pub use error::{DishbrainError, Result};
pub use loader::{IncrementalLoader, LoadCursor, LoadedPage};
pub use lookup::{Lookups, NewsItem, PhotoResult};
pub use presentation::{Frame, ListMode, ResultPresenter, ScrollMetrics, VirtualWindow};
pub use search::{search, QueryDebouncer, SearchTicket};
pub use session::{ExpertSession, SessionBuilder};
pub use source::ExpertSource;
pub use storage::{ExpertRepository, RepositoryMetadata};
pub use types::*;

#[cfg(feature = "cli")]
pub use cli::CliApp;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
