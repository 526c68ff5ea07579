//! Layered configuration.
//!
//! Defaults, then an optional TOML file, then `DISHBRAIN__*` environment
//! variables (`DISHBRAIN__SEARCH__DEBOUNCE_MS=150`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const CONFIG_FILE_NAME: &str = "dishbrain.toml";
pub const ENV_PREFIX: &str = "DISHBRAIN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DishbrainConfig {
    pub source: SourceConfig,
    pub loader: LoaderConfig,
    pub search: SearchConfig,
    pub presentation: PresentationConfig,
    pub lookup: LookupConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Bundled,
    File,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Bundled,
            path: None,
            url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Records fetched when a view mounts.
    pub initial_chunk: usize,
    /// Records fetched per "load more".
    pub page_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            initial_chunk: 20,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub item_height: f64,
    pub overscan: usize,
    /// Load more once the remaining scroll distance drops to this many viewports.
    pub load_more_threshold: f64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            item_height: 200.0,
            overscan: 5,
            load_more_threshold: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the dashboard routes serving the news and photo lookups.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl DishbrainConfig {
    /// Load configuration, reading `path` if given (it must exist) or the
    /// default locations otherwise (they may be missing).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                for candidate in default_config_paths() {
                    builder = builder.add_source(File::from(candidate).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Message(e.to_string()).into())
    }
}

/// User config dir first, then the working directory, so the local file wins.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dirs) = ProjectDirs::from("ai", "dishbrain", "dishbrain") {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DishbrainConfig::default();
        assert_eq!(config.source.kind, SourceKind::Bundled);
        assert_eq!(config.loader.initial_chunk, 20);
        assert_eq!(config.loader.page_size, 10);
        assert_eq!(config.search.debounce(), Duration::from_millis(300));
        assert_eq!(config.presentation.overscan, 5);
        assert_eq!(config.presentation.item_height, 200.0);
        assert_eq!(config.presentation.load_more_threshold, 1.5);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[source]
kind = "file"
path = "/srv/experts.json"

[search]
debounce_ms = 120
"#
        )
        .unwrap();

        let config = DishbrainConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.path, Some(PathBuf::from("/srv/experts.json")));
        assert_eq!(config.search.debounce_ms, 120);
        // Untouched sections keep their defaults
        assert_eq!(config.loader.initial_chunk, 20);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = DishbrainConfig::load(Some(Path::new("/nonexistent/dishbrain.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_to_toml_renders_sections() {
        let rendered = DishbrainConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[loader]"));
        assert!(rendered.contains("initial_chunk = 20"));
        assert!(rendered.contains("kind = \"bundled\""));
        assert!(rendered.contains("[presentation]"));
        assert!(!rendered.contains("viewport_height"));
    }

    #[test]
    fn test_presentation_section_ignores_unused_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[presentation]
item_height = 120.0
viewport_height = 900.0
"#
        )
        .unwrap();

        let config = DishbrainConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.presentation.item_height, 120.0);
        assert_eq!(config.presentation.overscan, 5);
    }
}
