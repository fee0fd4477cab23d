/// Error types
use thiserror::Error;

/// Anything that prevents a successful, parseable analysis response
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Analysis API returned HTTP {0}")]
    Status(u16),

    #[error("Malformed analysis response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid settings JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
