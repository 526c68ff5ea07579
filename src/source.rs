//! Expert sources feeding the repository.
//!
//! A source yields the whole roster in one call. The repository calls it at
//! most once per session and turns any error into an empty roster, so the
//! sources themselves just report what went wrong.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{SourceConfig, SourceKind};
use crate::error::{DishbrainError, Result};
use crate::types::Expert;

/// Roster compiled into the binary.
const BUNDLED_EXPERTS: &str = include_str!("../data/experts.json");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpertSource: Send + Sync {
    /// Fetch every expert record, in source order.
    async fn fetch_all(&self) -> Result<Vec<Expert>>;

    /// Short human readable description, used in logs.
    fn describe(&self) -> String;
}

/// The fixed dataset shipped with the crate.
#[derive(Debug, Default, Clone)]
pub struct BundledSource;

#[async_trait]
impl ExpertSource for BundledSource {
    async fn fetch_all(&self) -> Result<Vec<Expert>> {
        parse_experts(BUNDLED_EXPERTS)
    }

    fn describe(&self) -> String {
        "bundled dataset".to_string()
    }
}

/// Records held in memory, mostly useful for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    experts: Vec<Expert>,
}

impl StaticSource {
    pub fn new(experts: Vec<Expert>) -> Self {
        Self { experts }
    }
}

#[async_trait]
impl ExpertSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<Expert>> {
        Ok(self.experts.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.experts.len())
    }
}

/// A JSON file holding an array of expert records.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ExpertSource for FileSource {
    async fn fetch_all(&self) -> Result<Vec<Expert>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_experts(&content)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// An HTTP endpoint answering `GET` with a JSON array of expert records.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl ExpertSource for HttpSource {
    async fn fetch_all(&self) -> Result<Vec<Expert>> {
        debug!(url = %self.url, "Fetching experts over HTTP");
        let experts = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Expert>>()
            .await?;
        Ok(experts)
    }

    fn describe(&self) -> String {
        format!("endpoint {}", self.url)
    }
}

/// Build the source selected by configuration.
pub fn source_from_config(config: &SourceConfig) -> Result<Arc<dyn ExpertSource>> {
    match config.kind {
        SourceKind::Bundled => Ok(Arc::new(BundledSource)),
        SourceKind::File => {
            let path = config.path.clone().ok_or_else(|| {
                DishbrainError::InvalidArgument("source.path is required for a file source".to_string())
            })?;
            Ok(Arc::new(FileSource::new(path)))
        }
        SourceKind::Http => {
            let url = config.url.clone().ok_or_else(|| {
                DishbrainError::InvalidArgument("source.url is required for an http source".to_string())
            })?;
            Ok(Arc::new(HttpSource::new(url, Duration::from_secs(config.timeout_secs))?))
        }
    }
}

fn parse_experts(content: &str) -> Result<Vec<Expert>> {
    serde_json::from_str(content).map_err(|e| DishbrainError::LoadFailure(format!("invalid expert JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_bundled_source_parses() {
        let experts = BundledSource.fetch_all().await.unwrap();
        assert_eq!(experts.len(), 7);
        assert!(experts.iter().all(|e| !e.id.is_empty()));
        assert!(experts.iter().any(|e| e.full_name().contains("Aidan Gomez")));
    }

    #[tokio::test]
    async fn test_file_source_reads_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","personalInfo":{{"fullName":"Ada"}},"institution":{{"name":"MIT"}}}}]"#
        )
        .unwrap();

        let source = FileSource::new(file.path());
        let experts = source.fetch_all().await.unwrap();
        assert_eq!(experts.len(), 1);
        assert_eq!(experts[0].full_name(), "Ada");
        assert!(source.describe().starts_with("file "));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileSource::new("/nonexistent/experts.json");
        let result = source.fetch_all().await;
        assert!(matches!(result, Err(DishbrainError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = FileSource::new(file.path()).fetch_all().await;
        assert!(matches!(result, Err(DishbrainError::LoadFailure(_))));
    }

    #[tokio::test]
    async fn test_http_source_fetches_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/experts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "exp391",
                    "personalInfo": { "fullName": "Dr. Aidan Gomez" },
                    "institution": { "name": "AI Research Institute" }
                }
            ])))
            .mount(&server)
            .await;

        let source = HttpSource::new(format!("{}/api/experts", server.uri()), Duration::from_secs(5)).unwrap();
        let experts = source.fetch_all().await.unwrap();
        assert_eq!(experts.len(), 1);
        assert_eq!(experts[0].id, "exp391");
    }

    #[tokio::test]
    async fn test_http_source_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = HttpSource::new(format!("{}/api/experts", server.uri()), Duration::from_secs(5)).unwrap();
        assert!(source.fetch_all().await.is_err());
    }

    #[test]
    fn test_source_from_config_requires_path() {
        let config = SourceConfig {
            kind: SourceKind::File,
            path: None,
            url: None,
            timeout_secs: 5,
        };
        assert!(source_from_config(&config).is_err());

        let config = SourceConfig {
            kind: SourceKind::Bundled,
            ..config
        };
        let source = source_from_config(&config).unwrap();
        assert_eq!(source.describe(), "bundled dataset");
    }
}
