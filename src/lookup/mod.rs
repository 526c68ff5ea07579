//! Clients for the external news and photo lookups.
//!
//! Both are opaque remote calls. Their failures never reach the directory
//! core: the `fetch_news`/`find_photo` helpers degrade to "no data".

pub mod news;
pub mod photo;

pub use news::{fetch_news, HttpNewsLookup, NewsItem, NewsLookup, NewsRequest, MAX_NEWS_ITEMS};
pub use photo::{enrich_photo, find_photo, HttpPhotoLookup, PhotoLookup, PhotoRequest, PhotoResult};

use std::sync::Arc;

use crate::config::LookupConfig;
use crate::error::Result;
use crate::types::Expert;

/// Company sent to the lookups: the current organization, else the institution.
pub(crate) fn company_of(expert: &Expert) -> &str {
    expert
        .current_role
        .organization
        .as_deref()
        .filter(|organization| !organization.is_empty())
        .unwrap_or_else(|| expert.institution_name())
}

#[derive(Clone)]
pub struct Lookups {
    pub news: Arc<dyn NewsLookup>,
    pub photo: Arc<dyn PhotoLookup>,
}

impl Lookups {
    pub fn new(news: Arc<dyn NewsLookup>, photo: Arc<dyn PhotoLookup>) -> Self {
        Self { news, photo }
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            news: Arc::new(HttpNewsLookup::new(&config.base_url, config.timeout())?),
            photo: Arc::new(HttpPhotoLookup::new(&config.base_url, config.timeout())?),
        })
    }

    pub async fn news_for(&self, expert: &Expert) -> Vec<NewsItem> {
        fetch_news(self.news.as_ref(), &NewsRequest::for_expert(expert)).await
    }

    pub async fn photo_for(&self, expert: &Expert) -> PhotoResult {
        find_photo(self.photo.as_ref(), &PhotoRequest::for_expert(expert)).await
    }
}
