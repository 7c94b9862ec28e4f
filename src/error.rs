use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a single aggregation run.
///
/// Listings with a missing price or missing main-filter value are not errors;
/// they are dropped by the aggregator.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("request to listings source failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected listings shape: {0}")]
    Shape(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),
}

impl AggregateError {
    pub fn shape(msg: impl Into<String>) -> Self {
        AggregateError::Shape(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AggregateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            AggregateError::Network(_) => "network",
            AggregateError::Decode(_) => "decode",
            AggregateError::Shape(_) => "shape",
            AggregateError::Io { .. } => "io",
            AggregateError::Config(_) => "config",
        }
    }
}
