use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{Expert, DEFAULT_AVATAR};

pub const PHOTO_PATH: &str = "/api/profile-photo-finder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRequest {
    pub name: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PhotoRequest {
    pub fn for_expert(expert: &Expert) -> Self {
        Self {
            name: expert.full_name().to_string(),
            company: super::company_of(expert).to_string(),
            email: expert.personal_info.email.clone(),
        }
    }
}

/// Photo lookup answer. `image_url` equal to [`DEFAULT_AVATAR`] means nothing
/// was found; `error` is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResult {
    #[serde(default = "default_image_url")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_image_url() -> String {
    DEFAULT_AVATAR.to_string()
}

impl PhotoResult {
    pub fn not_found() -> Self {
        Self {
            image_url: default_image_url(),
            error: None,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.image_url.is_empty() && self.image_url != DEFAULT_AVATAR
    }
}

#[async_trait]
pub trait PhotoLookup: Send + Sync {
    async fn lookup(&self, request: &PhotoRequest) -> Result<PhotoResult>;
}

/// Client for the dashboard's profile photo finder route.
#[derive(Debug, Clone)]
pub struct HttpPhotoLookup {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpPhotoLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PHOTO_PATH),
            client,
        })
    }
}

#[async_trait]
impl PhotoLookup for HttpPhotoLookup {
    async fn lookup(&self, request: &PhotoRequest) -> Result<PhotoResult> {
        debug!(endpoint = %self.endpoint, name = %request.name, "Looking up profile photo");
        let result = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<PhotoResult>()
            .await?;
        Ok(result)
    }
}

/// Look up a photo, treating any failure as "nothing found".
pub async fn find_photo(lookup: &dyn PhotoLookup, request: &PhotoRequest) -> PhotoResult {
    match lookup.lookup(request).await {
        Ok(result) => {
            if let Some(reason) = &result.error {
                debug!(name = %request.name, reason = %reason, "Photo lookup found nothing");
            }
            result
        }
        Err(e) => {
            warn!(name = %request.name, error = %e, "Photo lookup failed");
            PhotoResult::not_found()
        }
    }
}

/// Fill in a missing photo. Experts that already have their own image are
/// left alone and no lookup is made. Returns whether the image changed.
pub async fn enrich_photo(lookup: &dyn PhotoLookup, expert: &mut Expert) -> bool {
    let has_own_image = matches!(expert.personal_info.image.as_deref(), Some(image) if image != DEFAULT_AVATAR);
    if has_own_image {
        return false;
    }

    let result = find_photo(lookup, &PhotoRequest::for_expert(expert)).await;
    if result.is_found() {
        expert.personal_info.image = Some(result.image_url);
        true
    } else {
        false
    }
}
