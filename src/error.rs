use thiserror::Error;

/// Errors produced by the expert directory.
///
/// Most of these never escape the core: loads and lookups degrade to an
/// empty or default result at the boundary where they were issued. They are
/// still typed so the boundaries can log them and so strict callers such
/// as the HTTP API can report them.
#[derive(Error, Debug)]
pub enum DishbrainError {
    #[error("Failed to load experts: {0}")]
    LoadFailure(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid search input: {0}")]
    SearchInputInvalid(String),

    #[error("External lookup failed: {0}")]
    ExternalLookupFailure(String),

    #[error("Expert not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DishbrainError {
    /// Whether the error came from a collaborator rather than from the core.
    pub fn is_external(&self) -> bool {
        matches!(self, DishbrainError::ExternalLookupFailure(_) | DishbrainError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, DishbrainError>;
