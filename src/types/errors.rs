//! Error types for placegate.

use thiserror::Error;

/// Default result type for placegate.
pub type PlacegateResult<T> = Result<T, PlacegateError>;

/// Errors that can occur in placegate.
///
/// Persistence failures inside the cache and the rate limiter are recovered
/// locally and never reach callers as these variants; they only surface from
/// the stores themselves and from configuration or upstream calls.
#[derive(Error, Debug)]
pub enum PlacegateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid query type '{0}'")]
    InvalidQueryType(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Other(String),
}

impl PlacegateError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PlacegateError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for PlacegateError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
