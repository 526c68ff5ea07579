use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Expert;

pub const NEWS_PATH: &str = "/api/news-scraper";
pub const MAX_NEWS_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRequest {
    pub name: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
}

impl NewsRequest {
    pub fn for_expert(expert: &Expert) -> Self {
        Self {
            name: expert.full_name().to_string(),
            company: super::company_of(expert).to_string(),
            linkedin_url: expert.linkedin_url().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[async_trait]
pub trait NewsLookup: Send + Sync {
    async fn lookup(&self, request: &NewsRequest) -> Result<Vec<NewsItem>>;
}

/// Client for the dashboard's news scraper route.
#[derive(Debug, Clone)]
pub struct HttpNewsLookup {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpNewsLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), NEWS_PATH),
            client,
        })
    }
}

#[async_trait]
impl NewsLookup for HttpNewsLookup {
    async fn lookup(&self, request: &NewsRequest) -> Result<Vec<NewsItem>> {
        debug!(endpoint = %self.endpoint, name = %request.name, "Looking up news");
        let items = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<NewsItem>>()
            .await?;
        Ok(items)
    }
}

/// Look up news, treating any failure as "no news".
pub async fn fetch_news(lookup: &dyn NewsLookup, request: &NewsRequest) -> Vec<NewsItem> {
    match lookup.lookup(request).await {
        Ok(mut items) => {
            items.truncate(MAX_NEWS_ITEMS);
            items
        }
        Err(e) => {
            warn!(name = %request.name, error = %e, "News lookup failed");
            Vec::new()
        }
    }
}
